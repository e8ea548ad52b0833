//! Key hints for the status bar.

use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Hints shown on the table page.
pub const TABLE_HINTS: &str =
    "[hjkl] move  [s] sort  [/] filter  [f] filters  [Space] expand  [Enter] open  [q] quit";

/// Hints shown while a filter is edited.
pub const FILTER_HINTS: &str = "[Enter/Esc] done  [Ctrl+U] clear";

/// Hints shown on the object viewer page.
pub const VIEWER_HINTS: &str = "[j/k] scroll  [Esc/q] back";

/// Split hint text into spans, keys (bracketed) in cyan.
pub fn hint_spans(hints: &str) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(Color::Cyan);
    let text_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    let mut rest = hints;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            spans.push(Span::styled(rest[..open].to_string(), text_style));
        }
        spans.push(Span::styled(rest[open..=close].to_string(), key_style));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), text_style));
    }
    spans
}
