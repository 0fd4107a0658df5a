//! Mention autocomplete
//!
//! Turns trigger keystrokes into atomic mention nodes inside a host document.
//! Each concern is a plugin that subscribes to the command bus; plugins never
//! call each other, they dispatch commands:
//!
//! ```text
//! Key ─┬─> cancellation (High)   Escape / Backspace / Blur → Cancel
//!      ├─> navigation   (High)   Left / Right across mentions
//!      ├─> trigger      (Normal) '@' → ShowMentions
//!      ├─> dropdown     (Normal) Up / Down / Enter / Tab while open
//!      └─> deletion     (Normal, Low) Backspace around mentions
//!
//! DocumentChanged → tracker → ContentUpdate → filter → FilterUpdate → dropdown
//! SelectMention   → transform (High) → dropdown (Normal)
//! ```
//!
//! [`MentionEditor`] wires the plugins to one document and one session.

pub mod cancellation;
pub mod commands;
pub mod context;
pub mod deletion;
pub mod dropdown;
pub mod editor;
pub mod filter;
pub mod geometry;
pub mod navigation;
pub mod session;
pub mod tracker;
pub mod transform;
pub mod trigger;

pub use commands::{CommandKind, Direction, EditorKey, MentionCommand};
pub use context::{MentionBus, MentionContext};
pub use editor::{KeyOutcome, MentionEditor};
pub use filter::{filter_candidates, filter_with};
pub use session::{
    Candidate, DropdownPosition, DropdownView, MentionSession, SessionEnd, SessionState,
    TriggerPosition,
};

/// Zero-width space separating mention nodes from their neighbours
pub const SENTINEL: char = '\u{200B}';
