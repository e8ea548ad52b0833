//! Object viewer page: the detail object of an activated row.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// Return to the table.
    Back,
}

/// Scrollable pretty-printed JSON.
#[derive(Debug, Default)]
pub struct ObjectViewer {
    scroll: u16,
}

impl ObjectViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Scroll back to the top for a new object.
    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ViewerAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                Some(ViewerAction::Back)
            }
            (KeyCode::Down | KeyCode::Char('j'), _) => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            (KeyCode::Up | KeyCode::Char('k'), _) => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            (KeyCode::PageDown, _) => {
                self.scroll = self.scroll.saturating_add(10);
                None
            }
            (KeyCode::PageUp, _) => {
                self.scroll = self.scroll.saturating_sub(10);
                None
            }
            (KeyCode::Home | KeyCode::Char('g'), _) => {
                self.scroll = 0;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, object: Option<&Value>, view_type: &str) {
        let lines: Vec<Line> = match object {
            Some(object) => json_lines(object),
            None => vec![Line::styled(
                "Nothing selected",
                Style::default().fg(Color::DarkGray),
            )],
        };

        let paragraph = Paragraph::new(lines).scroll((self.scroll, 0)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} detail ", view_type)),
        );
        frame.render_widget(paragraph, area);
    }
}

/// Pretty JSON with keys highlighted.
fn json_lines(object: &Value) -> Vec<Line<'static>> {
    let text = serde_json::to_string_pretty(object).unwrap_or_else(|_| object.to_string());
    text.lines()
        .map(|line| match line.split_once("\": ") {
            Some((key, rest)) => Line::from(vec![
                Span::styled(format!("{}\"", key), Style::default().fg(Color::Cyan)),
                Span::raw(format!(": {}", rest)),
            ]),
            None => Line::raw(line.to_string()),
        })
        .collect()
}
