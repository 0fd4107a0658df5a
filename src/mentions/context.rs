use super::commands::MentionCommand;
use super::session::{Candidate, MentionSession};
use crate::bus::CommandBus;
use crate::config::MentionConfig;
use crate::document::DocumentTree;

/// State shared by every mention plugin of one editor
#[derive(Debug)]
pub struct MentionContext<D> {
    pub document: D,
    pub session: MentionSession,
    /// Caller-supplied candidate directory, never mutated by plugins
    pub directory: Vec<Candidate>,
    pub config: MentionConfig,
}

impl<D: DocumentTree> MentionContext<D> {
    pub fn new(document: D, directory: Vec<Candidate>, config: MentionConfig) -> Self {
        Self {
            document,
            session: MentionSession::default(),
            directory,
            config,
        }
    }

    pub fn trigger_char(&self) -> char {
        self.config.trigger.character
    }
}

/// Bus carrying mention commands over a shared context
pub type MentionBus<D> = CommandBus<MentionCommand, MentionContext<D>>;
