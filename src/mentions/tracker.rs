//! Content tracking
//!
//! While a session is active, every document change re-derives the search
//! text from the tree. Nothing is cached: the trigger character is found
//! again by scanning left from the caret.

use anyhow::Result;

use super::commands::{CommandKind, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::TriggerPosition;
use crate::bus::{Priority, Subscription};
use crate::document::chars::{rfind_char, split_at_char};
use crate::document::DocumentTree;

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![bus.subscribe(
        CommandKind::DocumentChanged,
        Priority::Normal,
        on_document_changed::<D>,
    )]
}

/// Why the session can no longer track its search text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lost {
    NotInText,
    LeftTriggerNode,
    TriggerGone,
    Whitespace,
}

/// Search text and trigger offset for the current caret
fn track<D: DocumentTree>(ctx: &MentionContext<D>) -> Result<(TriggerPosition, String), Lost> {
    let (node, offset, text) = ctx.document.text_anchor().ok_or(Lost::NotInText)?;

    let bound = ctx.session.trigger.and_then(|trigger| trigger.node);
    if bound.is_some_and(|bound| bound != node) {
        return Err(Lost::LeftTriggerNode);
    }

    let (head, _) = split_at_char(&text, offset);
    let at = rfind_char(head, ctx.trigger_char()).ok_or(Lost::TriggerGone)?;
    let search_text: String = head.chars().skip(at + 1).collect();
    if search_text.chars().any(char::is_whitespace) {
        return Err(Lost::Whitespace);
    }

    Ok((
        TriggerPosition {
            node: Some(node),
            offset: at,
        },
        search_text,
    ))
}

fn on_document_changed<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    if !ctx.session.is_active() {
        return Ok(false);
    }

    match track(ctx) {
        Ok((trigger, search_text)) => {
            ctx.session.trigger = Some(trigger);
            bus.dispatch(&MentionCommand::ContentUpdate { search_text }, ctx)?;
        }
        Err(reason) => {
            tracing::debug!(?reason, "Lost track of mention search text");
            bus.dispatch(&MentionCommand::Cancel, ctx)?;
        }
    }
    Ok(false)
}
