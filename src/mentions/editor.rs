//! Mention editor
//!
//! One editor instance owns one bus, one session and one document. Hosts
//! forward key intercepts to [`MentionEditor::handle_key`] before their own
//! handling, and call [`MentionEditor::document_changed`] after mutating
//! the tree themselves.

use super::commands::{EditorKey, MentionCommand};
use super::context::{MentionBus, MentionContext};
use super::session::{Candidate, DropdownView, MentionSession};
use super::{cancellation, deletion, dropdown, filter, navigation, tracker, transform, trigger};
use crate::bus::Subscription;
use crate::config::MentionConfig;
use crate::document::{DefaultEditing, DocumentTree};
use crate::errors::MentionError;

/// Whether the host should still run its default key behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    PassThrough,
}

impl KeyOutcome {
    pub fn is_consumed(self) -> bool {
        self == KeyOutcome::Consumed
    }
}

/// Register every mention plugin on a bus
pub fn register_plugins<D: DocumentTree + 'static>(bus: &MentionBus<D>) -> Vec<Subscription> {
    let mut subscriptions = Vec::new();
    subscriptions.extend(cancellation::register(bus));
    subscriptions.extend(navigation::register(bus));
    subscriptions.extend(trigger::register(bus));
    subscriptions.extend(tracker::register(bus));
    subscriptions.extend(filter::register(bus));
    subscriptions.extend(dropdown::register(bus));
    subscriptions.extend(deletion::register(bus));
    subscriptions.extend(transform::register(bus));
    subscriptions
}

pub struct MentionEditor<D: DocumentTree + 'static> {
    // Dropped before the bus
    subscriptions: Vec<Subscription>,
    bus: MentionBus<D>,
    ctx: MentionContext<D>,
}

impl<D: DocumentTree + 'static> MentionEditor<D> {
    pub fn new(document: D, directory: Vec<Candidate>) -> Self {
        Self::with_config(document, directory, MentionConfig::default())
    }

    pub fn with_config(document: D, directory: Vec<Candidate>, config: MentionConfig) -> Self {
        let bus = MentionBus::new();
        let subscriptions = register_plugins(&bus);
        tracing::debug!(
            plugins = subscriptions.len(),
            trigger = %config.trigger.character,
            "Mention editor attached"
        );
        Self {
            subscriptions,
            bus,
            ctx: MentionContext::new(document, directory, config),
        }
    }

    /// Dispatch a command, then report any tree change it caused
    fn dispatch(&mut self, command: MentionCommand) -> Result<bool, MentionError> {
        let revision = self.ctx.document.revision();
        let handled = self.bus.dispatch(&command, &mut self.ctx)?;
        if self.ctx.document.revision() != revision {
            self.bus
                .dispatch(&MentionCommand::DocumentChanged, &mut self.ctx)?;
        }
        Ok(handled)
    }

    /// Intercept a key before the host handles it
    pub fn handle_key(&mut self, key: EditorKey) -> Result<KeyOutcome, MentionError> {
        let handled = self.dispatch(MentionCommand::Key(key))?;
        Ok(if handled {
            KeyOutcome::Consumed
        } else {
            KeyOutcome::PassThrough
        })
    }

    /// The host mutated the tree or moved the selection
    pub fn document_changed(&mut self) -> Result<(), MentionError> {
        self.bus
            .dispatch(&MentionCommand::DocumentChanged, &mut self.ctx)?;
        Ok(())
    }

    pub fn focus(&mut self) -> Result<(), MentionError> {
        self.ctx.document.focus();
        self.dispatch(MentionCommand::Focus)?;
        Ok(())
    }

    pub fn blur(&mut self) -> Result<(), MentionError> {
        self.dispatch(MentionCommand::Blur)?;
        Ok(())
    }

    /// Commit a dropdown row picked with the pointer
    pub fn select_candidate(&mut self, index: usize) -> Result<bool, MentionError> {
        if !self.ctx.session.is_open() {
            return Ok(false);
        }
        let Some(candidate) = self.ctx.session.filtered_candidates.get(index).cloned() else {
            return Ok(false);
        };
        self.ctx.session.highlighted_index = index;
        self.dispatch(MentionCommand::SelectMention(candidate))
    }

    /// Dropdown render model
    pub fn view(&self) -> DropdownView {
        self.ctx.session.view()
    }

    pub fn session(&self) -> &MentionSession {
        &self.ctx.session
    }

    pub fn document(&self) -> &D {
        &self.ctx.document
    }

    /// Direct access for host-side mutations; follow with `document_changed`
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.ctx.document
    }

    pub fn config(&self) -> &MentionConfig {
        &self.ctx.config
    }

    /// Unregister every plugin and hand the document back
    pub fn detach(mut self) -> D {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        tracing::debug!("Mention editor detached");
        self.ctx.document
    }
}

impl<D: DocumentTree + DefaultEditing + 'static> MentionEditor<D> {
    /// Handle a key like a host would: mention plugins first, then the
    /// document's default editing when the key passes through
    pub fn press(&mut self, key: EditorKey) -> Result<KeyOutcome, MentionError> {
        let outcome = self.handle_key(key)?;
        if outcome.is_consumed() {
            return Ok(outcome);
        }

        let revision = self.ctx.document.revision();
        let doc = &mut self.ctx.document;
        match key {
            EditorKey::Char(ch) => doc.insert_char(ch)?,
            EditorKey::Backspace => doc.delete_backward()?,
            EditorKey::ArrowLeft => doc.move_left()?,
            EditorKey::ArrowRight => doc.move_right()?,
            EditorKey::Enter => doc.insert_paragraph()?,
            EditorKey::Escape | EditorKey::ArrowUp | EditorKey::ArrowDown | EditorKey::Tab => {}
        }
        if self.ctx.document.revision() != revision {
            self.document_changed()?;
        }
        Ok(outcome)
    }

    pub fn type_str(&mut self, text: &str) -> Result<(), MentionError> {
        for ch in text.chars() {
            self.press(EditorKey::Char(ch))?;
        }
        Ok(())
    }
}
