//! Mention commit
//!
//! Replaces `@search` before the caret with a mention node, in one
//! transaction:
//!
//! ```text
//! before: [prefix @search|suffix]
//! after:  [prefix ·][MENTION][· |suffix]
//! ```
//!
//! `·` is the sentinel; the caret lands after the trailing sentinel and space.
//! When the trigger can no longer be found the commit is dropped and the
//! session is cancelled instead.

use anyhow::Result;

use super::commands::{CommandKind, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::SENTINEL;
use crate::bus::{Priority, Subscription};
use crate::document::chars::{rfind_char, split_at_char};
use crate::document::{DocumentTree, Mention, NewNode, SelectionPoint, Transaction};

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    // Runs before the dropdown closes the session
    vec![bus.subscribe(CommandKind::SelectMention, Priority::High, on_select::<D>)]
}

/// Drop the commit and end the session as cancelled
fn abort<D: DocumentTree + 'static>(
    reason: &str,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    tracing::debug!(reason, "Skipping mention commit");
    bus.dispatch(&MentionCommand::Cancel, ctx)?;
    Ok(true)
}

fn on_select<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    let MentionCommand::SelectMention(candidate) = command else {
        return Ok(false);
    };
    let trigger_char = ctx.trigger_char();

    let Some((node, offset, text)) = ctx.document.text_anchor() else {
        return abort("caret is not in text", ctx, bus);
    };
    let (head, suffix) = split_at_char(&text, offset);
    let Some(trigger_at) = rfind_char(head, trigger_char) else {
        return abort("trigger character not found", ctx, bus);
    };
    let (prefix, _search) = split_at_char(head, trigger_at);

    let doc = &mut ctx.document;
    let mention_id = doc.reserve_id();
    let trailing_id = doc.reserve_id();

    let mut tx = Transaction::new();
    tx.set_text(node, format!("{prefix}{SENTINEL}"))
        .insert_after(node, mention_id, NewNode::Mention(Mention::from(candidate)))
        .insert_after(
            mention_id,
            trailing_id,
            NewNode::Text(format!("{SENTINEL} {suffix}")),
        )
        .select(SelectionPoint::text(trailing_id, 2));
    doc.apply(tx)?;

    tracing::debug!(%node, %mention_id, "Inserted mention node");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, MemoryDocument};
    use crate::mentions::session::Candidate;
    use crate::mentions::testing::{context, record};

    const Z: &str = "\u{200B}";

    fn select(ctx: &mut MentionContext<MemoryDocument>, candidate: Candidate) -> bool {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        bus.dispatch(&MentionCommand::SelectMention(candidate), ctx)
            .unwrap()
    }

    #[test]
    fn test_commit_at_end_of_text() {
        let mut ctx = context(MemoryDocument::from_inlines(vec![Inline::text("hi @al")]));

        assert!(!select(&mut ctx, Candidate::new("u1", "Alice")));
        assert_eq!(
            ctx.document.snapshot(),
            vec![vec![
                Inline::text(format!("hi {Z}")),
                Inline::mention("u1", "Alice"),
                Inline::text(format!("{Z} ")),
            ]]
        );
        let caret = ctx.document.selection().unwrap();
        assert_eq!(caret.offset, 2);
        assert_eq!(ctx.document.text(caret.node).unwrap(), format!("{Z} "));
    }

    #[test]
    fn test_commit_keeps_suffix() {
        let mut doc = MemoryDocument::from_inlines(vec![Inline::text("@bo, hi")]);
        let node = doc.children(doc.paragraphs()[0])[0];
        doc.set_selection(SelectionPoint::text(node, 3)).unwrap();
        let mut ctx = context(doc);

        select(&mut ctx, Candidate::new("u2", "Bob"));
        assert_eq!(
            ctx.document.snapshot(),
            vec![vec![
                Inline::text(Z),
                Inline::mention("u2", "Bob"),
                Inline::text(format!("{Z} , hi")),
            ]]
        );
    }

    #[test]
    fn test_uses_last_trigger_before_caret() {
        let mut ctx = context(MemoryDocument::from_inlines(vec![Inline::text(
            "mail a@b.c @bo",
        )]));

        select(&mut ctx, Candidate::new("u2", "Bob"));
        let first = ctx.document.snapshot()[0][0].clone();
        assert_eq!(first, Inline::text(format!("mail a@b.c {Z}")));
    }

    #[test]
    fn test_missing_trigger_cancels_instead_of_committing() {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        let (_rec, cancels) = record(&bus, CommandKind::Cancel);
        let mut ctx = context(MemoryDocument::from_inlines(vec![Inline::text("plain")]));
        let revision = ctx.document.revision();

        let handled = bus
            .dispatch(
                &MentionCommand::SelectMention(Candidate::new("u1", "Alice")),
                &mut ctx,
            )
            .unwrap();

        assert!(handled);
        assert_eq!(cancels.borrow().len(), 1);
        assert_eq!(ctx.document.revision(), revision);
        assert_eq!(ctx.document.snapshot(), vec![vec![Inline::text("plain")]]);
    }
}
