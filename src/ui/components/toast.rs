//! Toast messages.
//!
//! Short-lived messages stacked in the bottom-right corner. Lookup failures
//! and activations that fetched without navigating are reported here.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// How long info toasts stay up.
const INFO_DURATION: Duration = Duration::from_secs(3);

/// How long error toasts stay up.
const ERROR_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

impl ToastKind {
    pub fn icon(self) -> &'static str {
        match self {
            ToastKind::Info => "ℹ",
            ToastKind::Error => "✗",
        }
    }

    pub fn color(self) -> Color {
        match self {
            ToastKind::Info => Color::Blue,
            ToastKind::Error => Color::Red,
        }
    }
}

/// A single toast.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Info, INFO_DURATION)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error, ERROR_DURATION)
    }

    fn new(message: impl Into<String>, kind: ToastKind, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Replace the display duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }

    /// Rows needed to show this toast at `inner_width`, borders included.
    fn height(&self, inner_width: usize) -> u16 {
        // Icon and space
        let text_len = self.message.chars().count() + 2;
        let lines = if inner_width > 0 {
            text_len.div_ceil(inner_width)
        } else {
            1
        };
        lines as u16 + 2
    }
}

/// The visible toast stack; the oldest toast drops off when it overflows.
#[derive(Debug)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    max_visible: usize,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.queue.push_back(toast);
        while self.queue.len() > self.max_visible {
            self.queue.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::info(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::error(message));
    }

    /// Drop expired toasts. Called on every tick.
    pub fn tick(&mut self) {
        self.queue.retain(|t| !t.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    /// Render the stack in the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.queue.is_empty() {
            return;
        }

        let width = 50.min(area.width.saturating_sub(4));
        // Borders plus the icon prefix
        let inner_width = width.saturating_sub(4) as usize;

        let heights: Vec<u16> = self.queue.iter().map(|t| t.height(inner_width)).collect();
        let total_height = heights.iter().sum::<u16>().min(area.height.saturating_sub(2));

        let x = area.x + area.width.saturating_sub(width + 2);
        let y = area.y + area.height.saturating_sub(total_height + 1);
        let stack = Rect::new(x, y, width, total_height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(heights.iter().map(|&h| Constraint::Length(h)))
            .split(stack);

        for (toast, chunk) in self.queue.iter().zip(chunks.iter()) {
            render_toast(toast, frame, *chunk);
        }
    }
}

fn render_toast(toast: &Toast, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let style = Style::default().fg(toast.kind.color());
    let text = Line::from(vec![
        Span::styled(
            format!("{} ", toast.kind.icon()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(toast.message.as_str(), style),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
