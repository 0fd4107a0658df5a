//! Dropdown controller
//!
//! Owns the visible half of the session: candidate list, highlight and
//! placement. It also settles the session's terminal states, so `Cancel`
//! and `SelectMention` always end with the session back in `Idle`.

use anyhow::Result;

use super::commands::{CommandKind, Direction, EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::{DropdownPosition, SessionEnd, SessionState};
use crate::bus::{Priority, Subscription};
use crate::config::DropdownConfig;
use crate::document::{CaretRect, DocumentTree, Viewport};

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![
        bus.subscribe(CommandKind::ShowMentions, Priority::Normal, on_show::<D>),
        bus.subscribe(CommandKind::FilterUpdate, Priority::Normal, on_filter::<D>),
        bus.subscribe(CommandKind::MoveSelection, Priority::Normal, on_move::<D>),
        bus.subscribe(CommandKind::SelectHighlighted, Priority::Normal, on_select_highlighted::<D>),
        bus.subscribe(CommandKind::SelectMention, Priority::Normal, on_select_mention::<D>),
        bus.subscribe(CommandKind::Key, Priority::Normal, on_key::<D>),
        bus.subscribe(CommandKind::Focus, Priority::Normal, on_focus::<D>),
        // Last, after every other plugin has seen the cancellation
        bus.subscribe(CommandKind::Cancel, Priority::Low, on_cancel::<D>),
    ]
}

/// Place the dropdown below-right of the caret, keeping it inside the viewport
///
/// Shifted left when it would overflow the right edge, flipped above the
/// caret when there is no room below.
pub fn compute_position(
    caret: CaretRect,
    viewport: Viewport,
    config: &DropdownConfig,
) -> DropdownPosition {
    let DropdownConfig {
        width,
        height,
        margin,
        ..
    } = *config;

    let mut x = caret.x;
    if x + width > viewport.width - margin {
        x = viewport.width - width - margin;
    }
    x = x.max(margin);

    let mut y = caret.bottom();
    if y + height > viewport.height - margin {
        y = caret.y - height;
        if y < 0.0 {
            y = caret.y.min(viewport.height - height - margin).max(0.0);
        }
    }

    DropdownPosition { x, y }
}

fn reposition<D: DocumentTree>(ctx: &mut MentionContext<D>) {
    if let Some(caret) = ctx.document.caret_rect() {
        ctx.session.dropdown_position =
            compute_position(caret, ctx.document.viewport(), &ctx.config.dropdown);
    }
}

fn on_show<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    let session = &mut ctx.session;
    session.search_text.clear();
    session.filtered_candidates = ctx.directory.clone();
    session.highlighted_index = 0;
    session.state = SessionState::Open;
    reposition(ctx);

    tracing::info!(
        candidates = ctx.session.filtered_candidates.len(),
        "Mention dropdown opened"
    );
    Ok(false)
}

fn on_filter<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    let MentionCommand::FilterUpdate {
        search_text,
        candidates,
    } = command
    else {
        return Ok(false);
    };
    if !ctx.session.is_active() {
        return Ok(false);
    }

    ctx.session.search_text = search_text.clone();
    ctx.session.filtered_candidates = candidates.clone();
    ctx.session.highlighted_index = 0;
    reposition(ctx);
    Ok(true)
}

fn on_move<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    let MentionCommand::MoveSelection(direction) = command else {
        return Ok(false);
    };
    let count = ctx.session.filtered_candidates.len();
    if count == 0 {
        return Ok(false);
    }

    let current = ctx.session.highlighted_index.min(count - 1);
    ctx.session.highlighted_index = match direction {
        Direction::Down => (current + 1) % count,
        Direction::Up => (current + count - 1) % count,
    };
    Ok(true)
}

fn on_select_highlighted<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    if !ctx.session.is_open() {
        return Ok(false);
    }
    let Some(candidate) = ctx.session.highlighted().cloned() else {
        return Ok(false);
    };
    bus.dispatch(&MentionCommand::SelectMention(candidate), ctx)?;
    Ok(true)
}

fn on_select_mention<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if let MentionCommand::SelectMention(candidate) = command {
        tracing::info!(id = %candidate.id, "Mention committed");
    }
    ctx.session.end(SessionEnd::Committed);
    Ok(true)
}

fn on_key<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    if !ctx.session.is_open() {
        return Ok(false);
    }
    let follow_up = match command {
        MentionCommand::Key(EditorKey::ArrowUp) => MentionCommand::MoveSelection(Direction::Up),
        MentionCommand::Key(EditorKey::ArrowDown) => {
            MentionCommand::MoveSelection(Direction::Down)
        }
        MentionCommand::Key(EditorKey::Enter | EditorKey::Tab) => {
            MentionCommand::SelectHighlighted
        }
        _ => return Ok(false),
    };
    bus.dispatch(&follow_up, ctx)?;
    Ok(true)
}

fn on_focus<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if ctx.session.is_open() {
        reposition(ctx);
    }
    Ok(false)
}

fn on_cancel<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    _bus: &MentionBus<D>,
) -> Result<bool> {
    if ctx.session.state != SessionState::Idle {
        tracing::info!(search = ctx.session.search_text.as_str(), "Mention session cancelled");
        ctx.session.end(SessionEnd::Cancelled);
    }
    Ok(true)
}
