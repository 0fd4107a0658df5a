//! Mention session state
//!
//! At most one session exists per editor. It is created when the trigger
//! character is typed and ends on commit or cancel.

use serde::{Deserialize, Serialize};

use crate::document::{Mention, NodeId};

/// Someone who can be mentioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Automated participants (bots, assistants) get a badge
    #[serde(default, alias = "isAI")]
    pub is_automated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_automated: false,
            avatar: None,
        }
    }

    pub fn automated(mut self) -> Self {
        self.is_automated = true;
        self
    }
}

impl From<&Candidate> for Mention {
    fn from(candidate: &Candidate) -> Self {
        Mention::new(candidate.id.clone(), candidate.name.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    /// Trigger seen, dropdown not shown yet
    Triggered,
    Open,
    /// Transient; the dropdown controller settles it back to `Idle`
    Cancelled,
}

/// How the last session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEnd {
    Committed,
    Cancelled,
}

/// Where the trigger character sits
///
/// `node` is `None` when the session started at an element point, until the
/// trigger character lands in a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPosition {
    pub node: Option<NodeId>,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DropdownPosition {
    pub x: f32,
    pub y: f32,
}

/// Ephemeral state of one mention interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionSession {
    pub state: SessionState,
    pub search_text: String,
    pub trigger: Option<TriggerPosition>,
    pub filtered_candidates: Vec<Candidate>,
    pub highlighted_index: usize,
    pub dropdown_position: DropdownPosition,
    pub last_outcome: Option<SessionEnd>,
}

impl MentionSession {
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Triggered | SessionState::Open)
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.filtered_candidates.get(self.highlighted_index)
    }

    /// Start over with the given trigger, keeping only the last outcome
    pub fn restart(&mut self, trigger: TriggerPosition) {
        *self = MentionSession {
            state: SessionState::Triggered,
            trigger: Some(trigger),
            last_outcome: self.last_outcome,
            ..MentionSession::default()
        };
    }

    /// Terminate the session and return to `Idle`
    pub fn end(&mut self, outcome: SessionEnd) {
        *self = MentionSession {
            last_outcome: Some(outcome),
            ..MentionSession::default()
        };
    }

    /// Render model for hosts
    pub fn view(&self) -> DropdownView {
        DropdownView {
            open: self.is_open(),
            position: self.dropdown_position,
            search_text: self.search_text.clone(),
            filtered_candidates: self.filtered_candidates.clone(),
            highlighted_index: self.highlighted_index,
        }
    }
}

/// What the host renders for the dropdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownView {
    pub open: bool,
    pub position: DropdownPosition,
    pub search_text: String,
    pub filtered_candidates: Vec<Candidate>,
    pub highlighted_index: usize,
}
