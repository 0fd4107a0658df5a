//! Arrow keys across mentions
//!
//! A mention and its sentinels behave as one caret stop: Left lands just
//! before the lead sentinel, Right just after the trail sentinel.

use anyhow::Result;

use super::commands::{CommandKind, EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::geometry::{
    is_after_mention, is_after_mention_gap, is_before_mention, is_before_mention_gap,
    position_after_mention, position_before_mention, Adjacency,
};
use crate::bus::{Priority, Subscription};
use crate::document::{DocumentTree, SelectionPoint, Transaction};

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![bus.subscribe(CommandKind::Key, Priority::High, on_key::<D>)]
}

fn on_key<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    let doc = &ctx.document;
    let Some(point) = doc.selection() else {
        return Ok(false);
    };

    let target = match command {
        MentionCommand::Key(EditorKey::ArrowLeft) => is_after_mention(doc, point)
            .or_else(|| is_after_mention_gap(doc, point))
            .or_else(|| is_before_mention_gap(doc, point))
            .and_then(|Adjacency { mention, .. }| position_before_mention(doc, mention)),
        MentionCommand::Key(EditorKey::ArrowRight) => is_before_mention(doc, point)
            .or_else(|| is_before_mention_gap(doc, point))
            .or_else(|| is_after_mention_gap(doc, point))
            .and_then(|Adjacency { mention, .. }| position_after_mention(doc, mention)),
        _ => None,
    };

    let Some(target) = target else {
        return Ok(false);
    };
    move_caret(&mut ctx.document, point, target)?;
    Ok(true)
}

fn move_caret<D: DocumentTree>(
    doc: &mut D,
    from: SelectionPoint,
    to: SelectionPoint,
) -> Result<()> {
    tracing::debug!(?from, ?to, "Caret jumps over mention");
    let mut tx = Transaction::new();
    tx.select(to);
    doc.apply(tx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, MemoryDocument, NodeId};
    use crate::mentions::testing::context;

    const Z: &str = "\u{200B}";

    fn press(ctx: &mut MentionContext<MemoryDocument>, key: EditorKey) -> bool {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        bus.dispatch(&MentionCommand::Key(key), ctx).unwrap()
    }

    fn committed() -> (MentionContext<MemoryDocument>, Vec<NodeId>) {
        let doc = MemoryDocument::from_inlines(vec![
            Inline::text(format!("hi {Z}")),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} ")),
        ]);
        let nodes = doc.children(doc.paragraphs()[0]);
        (context(doc), nodes)
    }

    #[test]
    fn test_left_from_after_trail_jumps_before_lead() {
        let (mut ctx, n) = committed();
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 1))
            .unwrap();

        assert!(press(&mut ctx, EditorKey::ArrowLeft));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[0], 3)));

        assert!(press(&mut ctx, EditorKey::ArrowRight));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[2], 1)));
    }

    #[test]
    fn test_gaps_jump_across() {
        let (mut ctx, n) = committed();

        // Between the lead sentinel and the mention
        ctx.document
            .set_selection(SelectionPoint::text(n[0], 4))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowRight));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[2], 1)));

        // Between the mention and the trail sentinel
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 0))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowLeft));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[0], 3)));
    }

    #[test]
    fn test_gaps_jump_back_the_other_way() {
        let (mut ctx, n) = committed();

        // Left from between the lead sentinel and the mention
        ctx.document
            .set_selection(SelectionPoint::text(n[0], 4))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowLeft));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[0], 3)));

        // Right from between the mention and the trail sentinel
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 0))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowRight));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[2], 1)));
    }

    #[test]
    fn test_shared_separator_between_mentions() {
        let doc = MemoryDocument::from_inlines(vec![
            Inline::text(Z),
            Inline::mention("u1", "Alice"),
            Inline::text(format!("{Z} {Z}")),
            Inline::mention("u2", "Bob"),
            Inline::text(format!("{Z} ")),
        ]);
        let n = doc.children(doc.paragraphs()[0]);
        let mut ctx = context(doc);

        // After Alice's trail sentinel: Left jumps back over Alice
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 1))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowLeft));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[0], 0)));

        // Before Bob's lead sentinel: Right jumps over Bob
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 2))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowRight));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[4], 1)));

        // Between Bob's lead sentinel and Bob: Left lands before that sentinel
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 3))
            .unwrap();
        assert!(press(&mut ctx, EditorKey::ArrowLeft));
        assert_eq!(ctx.document.selection(), Some(SelectionPoint::text(n[2], 2)));

        // The space in the middle is plain text
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 2))
            .unwrap();
        assert!(!press(&mut ctx, EditorKey::ArrowLeft));
    }

    #[test]
    fn test_ordinary_text_is_left_to_host() {
        let (mut ctx, n) = committed();
        ctx.document
            .set_selection(SelectionPoint::text(n[2], 2))
            .unwrap();
        assert!(!press(&mut ctx, EditorKey::ArrowLeft));

        ctx.document
            .set_selection(SelectionPoint::text(n[0], 1))
            .unwrap();
        assert!(!press(&mut ctx, EditorKey::ArrowRight));
        assert!(!press(&mut ctx, EditorKey::ArrowUp));
    }
}
