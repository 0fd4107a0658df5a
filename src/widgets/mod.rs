//! Terminal widgets for hosts built on ratatui

mod mention_dropdown;

pub use mention_dropdown::MentionDropdownWidget;
