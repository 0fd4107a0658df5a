//! Mention commands
//!
//! Every interaction between the mention plugins travels over the bus as a
//! [`MentionCommand`]. Key intercepts arrive as [`EditorKey`]s, which terminal
//! hosts obtain from crossterm events via [`EditorKey::from_key_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

use super::session::Candidate;
use crate::bus::BusCommand;

/// Keys the mention engine intercepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorKey {
    Char(char),
    Backspace,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Tab,
}

impl EditorKey {
    /// Convert a terminal key event into an editor key
    ///
    /// Modified keys (other than Shift on characters) and key releases are
    /// left to the host.
    pub fn from_key_event(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Some(Self::Char(c)),
            (KeyCode::Backspace, _) => Some(Self::Backspace),
            (KeyCode::Esc, _) => Some(Self::Escape),
            (KeyCode::Left, KeyModifiers::NONE) => Some(Self::ArrowLeft),
            (KeyCode::Right, KeyModifiers::NONE) => Some(Self::ArrowRight),
            (KeyCode::Up, KeyModifiers::NONE) => Some(Self::ArrowUp),
            (KeyCode::Down, KeyModifiers::NONE) => Some(Self::ArrowDown),
            (KeyCode::Enter, KeyModifiers::NONE) => Some(Self::Enter),
            (KeyCode::Tab, KeyModifiers::NONE) => Some(Self::Tab),
            _ => None,
        }
    }
}

/// Highlight movement in the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// Commands exchanged by the mention plugins
#[derive(Debug, Clone, PartialEq)]
pub enum MentionCommand {
    /// Key intercepted before the host's default handling
    Key(EditorKey),
    /// The host tree or selection changed
    DocumentChanged,
    Focus,
    Blur,

    // Session lifecycle
    ShowMentions,
    Cancel,
    ContentUpdate {
        search_text: String,
    },
    FilterUpdate {
        search_text: String,
        candidates: Vec<Candidate>,
    },

    // Dropdown interaction
    MoveSelection(Direction),
    SelectHighlighted,
    SelectMention(Candidate),
}

/// Discriminant handlers subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Key,
    DocumentChanged,
    Focus,
    Blur,
    ShowMentions,
    Cancel,
    ContentUpdate,
    FilterUpdate,
    MoveSelection,
    SelectHighlighted,
    SelectMention,
}

impl BusCommand for MentionCommand {
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        match self {
            MentionCommand::Key(_) => CommandKind::Key,
            MentionCommand::DocumentChanged => CommandKind::DocumentChanged,
            MentionCommand::Focus => CommandKind::Focus,
            MentionCommand::Blur => CommandKind::Blur,
            MentionCommand::ShowMentions => CommandKind::ShowMentions,
            MentionCommand::Cancel => CommandKind::Cancel,
            MentionCommand::ContentUpdate { .. } => CommandKind::ContentUpdate,
            MentionCommand::FilterUpdate { .. } => CommandKind::FilterUpdate,
            MentionCommand::MoveSelection(_) => CommandKind::MoveSelection,
            MentionCommand::SelectHighlighted => CommandKind::SelectHighlighted,
            MentionCommand::SelectMention(_) => CommandKind::SelectMention,
        }
    }
}
