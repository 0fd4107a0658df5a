//! Mention dropdown widget
//!
//! Renders a [`DropdownView`] as a bordered popup listing candidates, with
//! the highlighted row marked and automated participants badged.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::mentions::{Candidate, DropdownView};

const DEFAULT_WIDTH: u16 = 36;
const DEFAULT_MAX_VISIBLE: usize = 8;

/// Renderable mention dropdown
pub struct MentionDropdownWidget<'a> {
    view: &'a DropdownView,
    max_visible: usize,
    width: u16,
    /// Host units per terminal cell, horizontally and vertically
    cell_size: (f32, f32),
}

impl<'a> MentionDropdownWidget<'a> {
    pub fn new(view: &'a DropdownView) -> Self {
        Self {
            view,
            max_visible: DEFAULT_MAX_VISIBLE,
            width: DEFAULT_WIDTH,
            cell_size: (1.0, 1.0),
        }
    }

    pub fn max_visible(mut self, rows: usize) -> Self {
        self.max_visible = rows.max(1);
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Scale for converting the view's position into cells
    pub fn cell_size(mut self, width: f32, height: f32) -> Self {
        self.cell_size = (width.max(1.0), height.max(1.0));
        self
    }

    fn rows(&self) -> usize {
        self.view.filtered_candidates.len().min(self.max_visible)
    }

    /// Popup rectangle inside `area`, anchored at the view's position
    fn calculate_area(&self, area: Rect) -> Rect {
        let width = self.width.min(area.width);
        // Borders plus at least one line for the empty state
        let wanted = self.rows().max(1) as u16 + 2
            + u16::from(self.view.filtered_candidates.len() > self.max_visible);
        let height = wanted.min(area.height);

        // f32 → u16 casts saturate
        let x = (self.view.position.x / self.cell_size.0) as u16;
        let y = (self.view.position.y / self.cell_size.1) as u16;
        let x = area.x + x.min(area.width.saturating_sub(width));
        let y = area.y + y.min(area.height.saturating_sub(height));

        Rect::new(x, y, width, height)
    }

    fn candidate_line(candidate: &Candidate, is_selected: bool) -> Line<'static> {
        let indicator = if is_selected { "▶ " } else { "  " };
        let mut spans = vec![Span::styled(
            indicator,
            Style::default().fg(if is_selected {
                Color::Cyan
            } else {
                Color::DarkGray
            }),
        )];

        let name_style = if is_selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(candidate.name.clone(), name_style));

        if candidate.is_automated {
            spans.push(Span::styled(" [AI]", Style::default().fg(Color::Magenta)));
        }
        spans.push(Span::styled(
            format!("  {}", candidate.id),
            Style::default().fg(Color::DarkGray),
        ));

        Line::from(spans)
    }
}

impl Widget for MentionDropdownWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.view.open || area.width == 0 || area.height == 0 {
            return;
        }

        let dropdown_area = self.calculate_area(area);
        Clear.render(dropdown_area, buf);

        let title = if self.view.search_text.is_empty() {
            " Mention ".to_string()
        } else {
            format!(" @{} ", self.view.search_text)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(dropdown_area);
        block.render(dropdown_area, buf);

        if inner.height < 1 {
            return;
        }

        let candidates = &self.view.filtered_candidates;
        if candidates.is_empty() {
            Paragraph::new("No matching contacts")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let visible = self.rows().min(inner.height as usize).max(1);
        // Scroll so the highlighted row stays visible
        let start = (self.view.highlighted_index + 1).saturating_sub(visible);

        let mut lines: Vec<Line<'static>> = candidates
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(index, candidate)| {
                Self::candidate_line(candidate, index == self.view.highlighted_index)
            })
            .collect();

        let hidden = candidates.len() - visible;
        if hidden > 0 {
            lines.push(Line::from(Span::styled(
                format!("  ... {hidden} more"),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
