//! Key script replay
//!
//! Drives a [`MentionEditor`] over a [`MemoryDocument`] from a compact key
//! script, the way a terminal host would feed it key events. Used by the
//! `replay` command and by tests.
//!
//! Script syntax: literal characters are typed as-is; `<enter>`, `<tab>`,
//! `<esc>`, `<bs>`, `<left>`, `<right>`, `<up>`, `<down>`, `<blur>` and
//! `<focus>` name special keys. A `<` that does not open a tag is literal.

use anyhow::{bail, Result};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use serde::Serialize;

use crate::config::MentionConfig;
use crate::document::{Inline, MemoryDocument};
use crate::mentions::{
    Candidate, DropdownPosition, DropdownView, EditorKey, MentionEditor, SessionEnd, SessionState,
    SENTINEL,
};
use crate::widgets::MentionDropdownWidget;

/// One step of a key script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Key(EditorKey),
    Blur,
    Focus,
}

fn named_step(name: &str) -> Option<ScriptStep> {
    let key = match name {
        "enter" => EditorKey::Enter,
        "tab" => EditorKey::Tab,
        "esc" => EditorKey::Escape,
        "bs" => EditorKey::Backspace,
        "left" => EditorKey::ArrowLeft,
        "right" => EditorKey::ArrowRight,
        "up" => EditorKey::ArrowUp,
        "down" => EditorKey::ArrowDown,
        "blur" => return Some(ScriptStep::Blur),
        "focus" => return Some(ScriptStep::Focus),
        _ => return None,
    };
    Some(ScriptStep::Key(key))
}

/// Parse a key script into steps
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    let mut rest = script;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(end) = rest.find('>') {
                let name = &rest[1..end];
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase()) {
                    match named_step(name) {
                        Some(step) => {
                            steps.push(step);
                            rest = &rest[end + 1..];
                            continue;
                        }
                        None => bail!("Unknown key <{}> in script", name),
                    }
                }
            }
        }
        steps.push(ScriptStep::Key(EditorKey::Char(ch)));
        rest = &rest[ch.len_utf8()..];
    }

    Ok(steps)
}

/// Candidates used when no directory file is given
pub fn demo_directory() -> Vec<Candidate> {
    vec![
        Candidate::new("u1", "Alice"),
        Candidate::new("u2", "Bob"),
        Candidate::new("u3", "Carol"),
        Candidate::new("helper", "Helper").automated(),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub state: SessionState,
    pub last_outcome: Option<SessionEnd>,
}

/// Final state after a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub paragraphs: Vec<Vec<Inline>>,
    pub plain_text: String,
    pub session: SessionSummary,
    pub dropdown: DropdownView,
}

/// Replay a script against an empty document
pub fn replay(
    steps: &[ScriptStep],
    directory: Vec<Candidate>,
    config: MentionConfig,
) -> Result<ReplayReport> {
    let mut editor = MentionEditor::with_config(MemoryDocument::new(), directory, config);

    for step in steps {
        tracing::debug!(?step, "Replaying step");
        match *step {
            ScriptStep::Key(key) => {
                editor.press(key)?;
            }
            ScriptStep::Blur => {
                editor.document_mut().set_focused(false);
                editor.blur()?;
            }
            ScriptStep::Focus => editor.focus()?,
        }
    }

    let session = editor.session();
    Ok(ReplayReport {
        paragraphs: editor.document().snapshot(),
        plain_text: editor.document().plain_text(),
        session: SessionSummary {
            state: session.state,
            last_outcome: session.last_outcome,
        },
        dropdown: editor.view(),
    })
}

/// Node text with sentinels drawn as `·`
fn visible_text(text: &str) -> String {
    text.chars()
        .map(|c| if c == SENTINEL { '·' } else { c })
        .collect()
}

/// Draw the dropdown with the terminal widget at the origin
pub fn render_dropdown(view: &DropdownView, max_visible: usize) -> String {
    let max_visible = max_visible.max(1);
    let placed = DropdownView {
        position: DropdownPosition::default(),
        ..view.clone()
    };
    let rows = placed.filtered_candidates.len().clamp(1, max_visible) as u16;
    let overflow = u16::from(placed.filtered_candidates.len() > max_visible);
    let area = Rect::new(0, 0, 36, rows + 2 + overflow);

    let mut buf = Buffer::empty(area);
    MentionDropdownWidget::new(&placed)
        .max_visible(max_visible)
        .render(area, &mut buf);

    let mut out = String::new();
    for y in 0..area.height {
        let row: String = (0..area.width)
            .map(|x| buf.cell((x, y)).map_or(" ", |cell| cell.symbol()))
            .collect();
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

impl ReplayReport {
    /// Human-readable rendering (`·` marks a sentinel)
    pub fn to_text(&self, max_visible: usize) -> String {
        let mut out = String::new();

        for (index, inlines) in self.paragraphs.iter().enumerate() {
            out.push_str(&format!("paragraph {}\n", index + 1));
            for inline in inlines {
                match inline {
                    Inline::Text { text } => {
                        out.push_str(&format!("  text    \"{}\"\n", visible_text(text)))
                    }
                    Inline::Mention { id, name } => {
                        out.push_str(&format!("  mention @{name} ({id})\n"))
                    }
                }
            }
        }

        out.push_str(&format!("plain: {}\n", self.plain_text));
        match self.session.last_outcome {
            Some(outcome) => out.push_str(&format!(
                "session: {:?} (last: {:?})\n",
                self.session.state, outcome
            )),
            None => out.push_str(&format!("session: {:?}\n", self.session.state)),
        }

        if self.dropdown.open {
            out.push_str(&format!(
                "dropdown: open at ({}, {})\n",
                self.dropdown.position.x, self.dropdown.position.y
            ));
            out.push_str(&render_dropdown(&self.dropdown, max_visible));
        } else {
            out.push_str("dropdown: closed\n");
        }
        out
    }
}
