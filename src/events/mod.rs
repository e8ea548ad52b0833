//! Terminal events.
//!
//! [`EventHandler`] polls crossterm and turns what it reads into [`Event`]s
//! for `App::update`.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An input to the application's update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Text pasted into the terminal.
    Paste(String),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
    /// Stop the application.
    Quit,
}
