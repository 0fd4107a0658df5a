//! mention-composer: mention autocomplete for rich-text chat composers
//!
//! This library provides:
//! - A prioritized command bus for decoupled editor plugins
//! - A document tree adapter trait plus an in-memory host
//! - Mention plugins: trigger, tracking, filtering, dropdown, commit,
//!   deletion, navigation and cancellation
//! - A ratatui dropdown widget and crossterm key mapping for terminal hosts

pub mod bus;
pub mod config;
pub mod document;
pub mod errors;
pub mod mentions;
pub mod replay;
pub mod widgets;

pub use config::MentionConfig;
pub use document::{DocumentTree, MemoryDocument};
pub use errors::{ConfigError, DocumentError, MentionError};
pub use mentions::{Candidate, DropdownView, EditorKey, KeyOutcome, MentionEditor};
