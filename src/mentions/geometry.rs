//! Cursor geometry around mention nodes
//!
//! A mention is always flanked by text nodes carrying a sentinel (U+200B,
//! drawn as `·`):
//!
//! ```text
//! [prefix·][MENTION][· suffix]
//!        ^ lead      ^ trail
//! ```
//!
//! The separator before a mention may be sentinel-only, text+sentinel, or
//! shared with a previous mention (sentinel+text+sentinel); we use its LAST
//! sentinel. The separator after a mention uses its FIRST sentinel.
//!
//! Caret positions relative to a mention:
//! - before: exactly on the lead sentinel's offset
//! - after: right after the trail sentinel
//! - before-gap: in the separator, past the lead sentinel
//! - after-gap: in the separator, at or before the trail sentinel

use crate::document::chars::{find_char, rfind_char};
use crate::document::{DocumentTree, NodeId, PointKind, SelectionPoint};

use super::SENTINEL;

/// A caret matched against a mention and the separator node it sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency {
    pub mention: NodeId,
    pub separator: NodeId,
}

/// Offset of the sentinel a separator shows to the mention after it
fn lead_index<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<usize> {
    rfind_char(&doc.text(node)?, SENTINEL)
}

/// Offset of the sentinel a separator shows to the mention before it
fn trail_index<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<usize> {
    find_char(&doc.text(node)?, SENTINEL)
}

fn next_mention<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    doc.next_sibling(node).filter(|next| doc.is_mention(*next))
}

fn previous_mention<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    doc.previous_sibling(node).filter(|prev| doc.is_mention(*prev))
}

/// Caret sits immediately before a mention's lead sentinel
///
/// Also recognises element points `(paragraph, i)` where child `i` is a
/// separator starting with its lead sentinel.
pub fn is_before_mention<D: DocumentTree + ?Sized>(
    doc: &D,
    point: SelectionPoint,
) -> Option<Adjacency> {
    match point.kind {
        PointKind::Text => {
            let mention = next_mention(doc, point.node)?;
            let lead = lead_index(doc, point.node)?;
            (point.offset == lead && position_after_mention(doc, mention).is_some()).then_some(
                Adjacency {
                    mention,
                    separator: point.node,
                },
            )
        }
        PointKind::Element => {
            let separator = doc.child_at(point.node, point.offset)?;
            let mention = next_mention(doc, separator)?;
            (lead_index(doc, separator)? == 0).then_some(Adjacency { mention, separator })
        }
    }
}

/// Caret sits immediately after a mention's trail sentinel
pub fn is_after_mention<D: DocumentTree + ?Sized>(
    doc: &D,
    point: SelectionPoint,
) -> Option<Adjacency> {
    if !point.is_text() {
        return None;
    }
    let mention = previous_mention(doc, point.node)?;
    let trail = trail_index(doc, point.node)?;
    (point.offset == trail + 1 && position_before_mention(doc, mention).is_some()).then_some(
        Adjacency {
            mention,
            separator: point.node,
        },
    )
}

/// Caret is inside the separator before a mention, past its lead sentinel
pub fn is_before_mention_gap<D: DocumentTree + ?Sized>(
    doc: &D,
    point: SelectionPoint,
) -> Option<Adjacency> {
    if !point.is_text() {
        return None;
    }
    let mention = next_mention(doc, point.node)?;
    let lead = lead_index(doc, point.node)?;
    (point.offset > lead).then_some(Adjacency {
        mention,
        separator: point.node,
    })
}

/// Caret is inside the separator after a mention, at or before its trail sentinel
pub fn is_after_mention_gap<D: DocumentTree + ?Sized>(
    doc: &D,
    point: SelectionPoint,
) -> Option<Adjacency> {
    if !point.is_text() {
        return None;
    }
    let mention = previous_mention(doc, point.node)?;
    let trail = trail_index(doc, point.node)?;
    (point.offset <= trail).then_some(Adjacency {
        mention,
        separator: point.node,
    })
}

/// Caret position just before a mention's lead sentinel
pub fn position_before_mention<D: DocumentTree + ?Sized>(
    doc: &D,
    mention: NodeId,
) -> Option<SelectionPoint> {
    let separator = doc.previous_sibling(mention)?;
    let lead = lead_index(doc, separator)?;
    Some(SelectionPoint::text(separator, lead))
}

/// Caret position just after a mention's trail sentinel
pub fn position_after_mention<D: DocumentTree + ?Sized>(
    doc: &D,
    mention: NodeId,
) -> Option<SelectionPoint> {
    let separator = doc.next_sibling(mention)?;
    let trail = trail_index(doc, separator)?;
    Some(SelectionPoint::text(separator, trail + 1))
}

/// Non-empty text made only of sentinels
pub fn is_sentinel_only(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, MemoryDocument};

    const Z: &str = "\u{200B}";

    /// Paragraph children of a single-paragraph document
    fn nodes(doc: &MemoryDocument) -> Vec<NodeId> {
        doc.children(doc.paragraphs()[0])
    }

    fn layout(prefix: &str, suffix: &str) -> MemoryDocument {
        MemoryDocument::from_inlines(vec![
            Inline::text(prefix),
            Inline::mention("u1", "Alice"),
            Inline::text(suffix),
        ])
    }

    #[test]
    fn test_sentinel_only_layout() {
        let doc = layout(Z, Z);
        let n = nodes(&doc);

        let before = SelectionPoint::text(n[0], 0);
        let after = SelectionPoint::text(n[2], 1);
        assert_eq!(position_before_mention(&doc, n[1]), Some(before));
        assert_eq!(position_after_mention(&doc, n[1]), Some(after));

        assert!(is_before_mention(&doc, before).is_some());
        assert!(is_after_mention(&doc, after).is_some());
        assert!(is_before_mention_gap(&doc, SelectionPoint::text(n[0], 1)).is_some());
        assert!(is_after_mention_gap(&doc, SelectionPoint::text(n[2], 0)).is_some());
    }

    #[test]
    fn test_text_then_sentinel_layout() {
        let prefix = format!("hi {Z}");
        let suffix = format!("{Z} there");
        let doc = layout(&prefix, &suffix);
        let n = nodes(&doc);

        assert_eq!(
            position_before_mention(&doc, n[1]),
            Some(SelectionPoint::text(n[0], 3))
        );
        assert_eq!(
            position_after_mention(&doc, n[1]),
            Some(SelectionPoint::text(n[2], 1))
        );

        // Inside the prefix text is not adjacency
        assert!(is_before_mention(&doc, SelectionPoint::text(n[0], 2)).is_none());
        assert!(is_before_mention_gap(&doc, SelectionPoint::text(n[0], 2)).is_none());
        // Past the trail sentinel and a space is ordinary text
        assert!(is_after_mention(&doc, SelectionPoint::text(n[2], 2)).is_none());
        assert!(is_after_mention_gap(&doc, SelectionPoint::text(n[2], 2)).is_none());
    }

    #[test]
    fn test_shared_separator_uses_both_ends() {
        let shared = format!("{Z} {Z}");
        let doc = MemoryDocument::from_inlines(vec![
            Inline::text(Z),
            Inline::mention("u1", "Alice"),
            Inline::text(shared),
            Inline::mention("u2", "Bob"),
            Inline::text(Z),
        ]);
        let n = nodes(&doc);

        let after_alice = is_after_mention(&doc, SelectionPoint::text(n[2], 1)).unwrap();
        assert_eq!(after_alice.mention, n[1]);

        let before_bob = is_before_mention(&doc, SelectionPoint::text(n[2], 2)).unwrap();
        assert_eq!(before_bob.mention, n[3]);
        assert_eq!(before_bob.separator, n[2]);

        assert_eq!(
            position_before_mention(&doc, n[3]),
            Some(SelectionPoint::text(n[2], 2))
        );
        assert_eq!(
            position_after_mention(&doc, n[1]),
            Some(SelectionPoint::text(n[2], 1))
        );
    }

    #[test]
    fn test_element_point_before_leading_separator() {
        let doc = layout(Z, Z);
        let paragraph = doc.paragraphs()[0];
        let n = nodes(&doc);

        let hit = is_before_mention(&doc, SelectionPoint::element(paragraph, 0)).unwrap();
        assert_eq!(hit.mention, n[1]);
        assert!(is_before_mention(&doc, SelectionPoint::element(paragraph, 2)).is_none());
    }

    #[test]
    fn test_missing_separator_is_not_adjacency() {
        let doc = MemoryDocument::from_inlines(vec![
            Inline::text("plain"),
            Inline::mention("u1", "Alice"),
        ]);
        let n = nodes(&doc);
        assert_eq!(position_before_mention(&doc, n[1]), None);
        assert_eq!(position_after_mention(&doc, n[1]), None);
        assert!(is_before_mention(&doc, SelectionPoint::text(n[0], 5)).is_none());
    }

    #[test]
    fn test_sentinel_only_check() {
        assert!(is_sentinel_only(Z));
        assert!(is_sentinel_only(&format!("{Z}{Z}")));
        assert!(!is_sentinel_only(""));
        assert!(!is_sentinel_only(&format!("{Z} ")));
    }
}
