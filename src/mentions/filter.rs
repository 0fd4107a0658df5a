//! Candidate filtering
//!
//! Case-insensitive substring match on display name (and optionally id),
//! preserving directory order.

use anyhow::Result;

use super::commands::{CommandKind, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::Candidate;
use crate::bus::{Priority, Subscription};
use crate::config::FilterConfig;
use crate::document::DocumentTree;

/// Filter with the default options
pub fn filter_candidates(candidates: &[Candidate], search_text: &str) -> Vec<Candidate> {
    filter_with(candidates, search_text, &FilterConfig::default())
}

pub fn filter_with(
    candidates: &[Candidate],
    search_text: &str,
    options: &FilterConfig,
) -> Vec<Candidate> {
    let needle = search_text.to_lowercase();
    let matches = candidates.iter().filter(|candidate| {
        needle.is_empty()
            || candidate.name.to_lowercase().contains(&needle)
            || (options.match_id && candidate.id.to_lowercase().contains(&needle))
    });

    match options.limit {
        Some(limit) => matches.take(limit).cloned().collect(),
        None => matches.cloned().collect(),
    }
}

pub fn register<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    vec![
        // After the dropdown has reset itself for the new session
        bus.subscribe(CommandKind::ShowMentions, Priority::Low, on_show::<D>),
        bus.subscribe(CommandKind::ContentUpdate, Priority::Normal, on_content::<D>),
    ]
}

fn emit<D: DocumentTree + 'static>(
    search_text: String,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    let candidates = filter_with(&ctx.directory, &search_text, &ctx.config.filter);
    tracing::debug!(
        search = search_text.as_str(),
        matches = candidates.len(),
        "Filtered candidates"
    );
    bus.dispatch(
        &MentionCommand::FilterUpdate {
            search_text,
            candidates,
        },
        ctx,
    )
}

fn on_show<D: DocumentTree + 'static>(
    _command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    emit(String::new(), ctx, bus)?;
    Ok(false)
}

fn on_content<D: DocumentTree + 'static>(
    command: &MentionCommand,
    ctx: &mut MentionContext<D>,
    bus: &MentionBus<D>,
) -> Result<bool> {
    let MentionCommand::ContentUpdate { search_text } = command else {
        return Ok(false);
    };
    emit(search_text.clone(), ctx, bus)?;
    Ok(true)
}
