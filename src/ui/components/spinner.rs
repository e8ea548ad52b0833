//! Spinner shown in the status bar while detail lookups are in flight.

use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An inline spinner with a message.
#[derive(Debug, Clone)]
pub struct Spinner {
    message: String,
    frame: usize,
    active: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::with_message("Loading...")
    }
}

impl Spinner {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
            active: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Start spinning with `message`. Restarts the animation.
    pub fn start(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.frame = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the animation. Called on every tick.
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }

    /// The spinner as a status bar span, or `None` when stopped.
    pub fn span(&self) -> Option<Span<'static>> {
        self.active.then(|| {
            Span::styled(
                format!("{} {}", self.frame(), self.message),
                Style::default().fg(Color::Cyan),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_starts_inactive() {
        let spinner = Spinner::default();
        assert!(!spinner.is_active());
        assert!(spinner.span().is_none());
    }

    #[test]
    fn test_tick_only_advances_when_active() {
        let mut spinner = Spinner::default();
        spinner.tick();
        assert_eq!(spinner.frame(), SPINNER_FRAMES[0]);

        spinner.start("Fetching details...");
        spinner.tick();
        assert_eq!(spinner.frame(), SPINNER_FRAMES[1]);
        assert_eq!(spinner.message(), "Fetching details...");
    }

    #[test]
    fn test_frames_wrap_around() {
        let mut spinner = Spinner::default();
        spinner.start("x");
        for _ in 0..SPINNER_FRAMES.len() {
            spinner.tick();
        }
        assert_eq!(spinner.frame(), SPINNER_FRAMES[0]);
    }

    #[test]
    fn test_span_contains_message() {
        let mut spinner = Spinner::default();
        spinner.start("Fetching details...");
        let span = spinner.span().unwrap();
        assert!(span.content.contains("Fetching details..."));
        spinner.stop();
        assert!(spinner.span().is_none());
    }
}
