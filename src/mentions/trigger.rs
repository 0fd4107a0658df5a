//! Trigger detection
//!
//! Typing the trigger character always starts a fresh session, even while
//! one is open. The key itself is left to the host so the character lands
//! in the document.

use anyhow::Result;

use super::commands::{CommandKind, EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::TriggerPosition;
use crate::bus::{Priority, Subscription};
use crate::document::DocumentTree;

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![bus.subscribe(CommandKind::Key, Priority::Normal, on_key::<D>)]
}

fn on_key<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    let MentionCommand::Key(EditorKey::Char(ch)) = command else {
        return Ok(false);
    };
    if *ch != ctx.trigger_char() {
        return Ok(false);
    }

    // An element anchor (empty paragraph) binds to a node once the char lands
    let trigger = match ctx.document.selection() {
        Some(point) if point.is_text() => TriggerPosition {
            node: Some(point.node),
            offset: point.offset,
        },
        Some(_) => TriggerPosition {
            node: None,
            offset: 0,
        },
        None => return Ok(false),
    };

    tracing::debug!(?trigger, "Trigger character typed");
    ctx.session.restart(trigger);
    bus.dispatch(&MentionCommand::ShowMentions, ctx)?;
    Ok(false)
}
