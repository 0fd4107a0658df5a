//! Cancellation monitor
//!
//! Ends the session on focus loss, on Escape while the dropdown is open, and
//! on a Backspace that would reach the trigger character. Content-driven
//! cancellation (whitespace, lost trigger) lives in the tracker.

use anyhow::Result;

use super::commands::{CommandKind, EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::SessionState;
use crate::bus::{Priority, Subscription};
use crate::document::DocumentTree;

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![
        bus.subscribe(CommandKind::Blur, Priority::High, on_blur::<D>),
        bus.subscribe(CommandKind::Key, Priority::High, on_key::<D>),
        bus.subscribe(CommandKind::Cancel, Priority::High, on_cancel::<D>),
    ]
}

fn on_blur<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    if ctx.session.is_active() {
        tracing::debug!("Editor lost focus during mention session");
        bus.dispatch(&MentionCommand::Cancel, ctx)?;
    }
    Ok(false)
}

/// Backspace would delete the trigger, or the caret left the trigger's node
fn backspace_escapes_trigger<D: DocumentTree>(ctx: &MentionContext<D>) -> bool {
    let Some(trigger) = ctx.session.trigger else {
        return true;
    };
    match ctx.document.selection() {
        Some(point) if point.is_text() => {
            trigger.node.is_some_and(|node| node != point.node)
                || point.offset <= trigger.offset + 1
        }
        _ => true,
    }
}

fn on_key<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    match command {
        MentionCommand::Key(EditorKey::Escape) if ctx.session.is_open() => {
            bus.dispatch(&MentionCommand::Cancel, ctx)?;
            ctx.document.focus();
            Ok(true)
        }
        MentionCommand::Key(EditorKey::Backspace)
            if ctx.session.is_active() && backspace_escapes_trigger(ctx) =>
        {
            tracing::debug!("Backspace reaches the trigger character");
            bus.dispatch(&MentionCommand::Cancel, ctx)?;
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn on_cancel<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if ctx.session.is_active() {
        ctx.session.state = SessionState::Cancelled;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, MemoryDocument, NodeId, SelectionPoint};
    use crate::mentions::session::TriggerPosition;
    use crate::mentions::testing::{context, record};

    fn open_session(text: &str) -> (MentionContext<MemoryDocument>, NodeId) {
        let doc = MemoryDocument::from_inlines(vec![Inline::text(text)]);
        let node = doc.children(doc.paragraphs()[0])[0];
        let mut ctx = context(doc);
        ctx.session.restart(TriggerPosition {
            node: Some(node),
            offset: 0,
        });
        ctx.session.state = SessionState::Open;
        (ctx, node)
    }

    #[test]
    fn test_escape_cancels_only_while_open() {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        let (_rec, cancels) = record(&bus, CommandKind::Cancel);
        let (mut ctx, _) = open_session("@al");
        ctx.document.set_focused(false);

        let escape = MentionCommand::Key(EditorKey::Escape);
        assert!(bus.dispatch(&escape, &mut ctx).unwrap());
        assert_eq!(ctx.session.state, SessionState::Cancelled);
        assert!(ctx.document.is_focused());

        ctx.session = Default::default();
        assert!(!bus.dispatch(&escape, &mut ctx).unwrap());
        assert_eq!(cancels.borrow().len(), 1);
    }

    #[test]
    fn test_backspace_onto_trigger_cancels() {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        let (mut ctx, node) = open_session("@al");

        let backspace = MentionCommand::Key(EditorKey::Backspace);
        ctx.document
            .set_selection(SelectionPoint::text(node, 3))
            .unwrap();
        assert!(!bus.dispatch(&backspace, &mut ctx).unwrap());
        assert_eq!(ctx.session.state, SessionState::Open);

        ctx.document
            .set_selection(SelectionPoint::text(node, 1))
            .unwrap();
        assert!(!bus.dispatch(&backspace, &mut ctx).unwrap());
        assert_eq!(ctx.session.state, SessionState::Cancelled);
    }

    #[test]
    fn test_blur_cancels_active_session() {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        let (mut ctx, _) = open_session("@");

        bus.dispatch(&MentionCommand::Blur, &mut ctx).unwrap();
        assert_eq!(ctx.session.state, SessionState::Cancelled);
    }

    #[test]
    fn test_cancel_while_idle_is_a_no_op() {
        let bus = MentionBus::new();
        let _subs = register(&bus);
        let mut ctx = context(MemoryDocument::new());

        bus.dispatch(&MentionCommand::Cancel, &mut ctx).unwrap();
        assert_eq!(ctx.session, Default::default());
    }
}
