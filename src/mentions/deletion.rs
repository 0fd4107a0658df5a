//! Backspace around mentions
//!
//! Two rules keep separators intact while deleting:
//!
//! - Rule A (Normal): Backspace on the last visible char of a one-char node
//!   next to a mention turns it into a sentinel instead of emptying it.
//! - Rule B (Low): Backspace with only sentinels left of the caret, right
//!   after a mention, removes the mention as a unit and tidies separators.
//!
//! Both consume the key. Anything else is left to the host.

use anyhow::Result;

use super::commands::{CommandKind, EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::geometry::is_sentinel_only;
use super::SENTINEL;
use crate::bus::{Priority, Subscription};
use crate::document::chars::{char_len, split_at_char};
use crate::document::{DocumentTree, SelectionPoint, Transaction};

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![
        bus.subscribe(CommandKind::Key, Priority::Normal, on_backspace_adjacent::<D>),
        bus.subscribe(CommandKind::Key, Priority::Low, on_backspace_mention::<D>),
    ]
}

fn is_backspace(command: &MentionCommand) -> bool {
    matches!(command, MentionCommand::Key(EditorKey::Backspace))
}

/// Rule A
fn on_backspace_adjacent<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if !is_backspace(command) {
        return Ok(false);
    }
    let doc = &mut ctx.document;
    let Some((node, offset, text)) = doc.text_anchor() else {
        return Ok(false);
    };
    if offset != 1 || char_len(&text) != 1 || text.starts_with(SENTINEL) {
        return Ok(false);
    }
    let next_to_mention = doc.previous_sibling(node).is_some_and(|n| doc.is_mention(n))
        || doc.next_sibling(node).is_some_and(|n| doc.is_mention(n));
    if !next_to_mention {
        return Ok(false);
    }

    let mut tx = Transaction::new();
    tx.set_text(node, SENTINEL.to_string())
        .select(SelectionPoint::text(node, 0));
    doc.apply(tx)?;
    tracing::debug!(%node, "Kept mention separator on backspace");
    Ok(true)
}

/// Rule B
fn on_backspace_mention<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if !is_backspace(command) {
        return Ok(false);
    }
    let doc = &mut ctx.document;
    let Some((node, offset, text)) = doc.text_anchor() else {
        return Ok(false);
    };
    let Some(mention) = doc.previous_sibling(node).filter(|m| doc.is_mention(*m)) else {
        return Ok(false);
    };
    let (head, _) = split_at_char(&text, offset);
    if !head.chars().all(|c| c == SENTINEL) {
        return Ok(false);
    }

    let mut tx = Transaction::new();
    tx.remove(mention);

    // Node that will sit right before `node` once the mention is gone
    let mut kept = doc.previous_sibling(mention);
    if let Some(before) = kept {
        let separator_only = doc.text(before).is_some_and(|t| is_sentinel_only(&t));
        let shared = doc
            .previous_sibling(before)
            .is_some_and(|n| doc.is_mention(n));
        if separator_only && !shared {
            tx.remove(before);
            kept = doc.previous_sibling(before);
        }
    }

    let collapse_into = kept.and_then(|k| {
        let kept_text = doc.text(k)?;
        (is_sentinel_only(&text) && kept_text.contains(SENTINEL)).then_some((k, kept_text))
    });
    match collapse_into {
        Some((target, target_text)) => {
            tx.remove(node)
                .select(SelectionPoint::text(target, char_len(&target_text)));
        }
        None => {
            tx.select(SelectionPoint::text(node, offset));
        }
    }

    doc.apply(tx)?;
    tracing::info!(%mention, "Deleted mention");
    Ok(true)
}
