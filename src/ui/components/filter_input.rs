//! Single-line input for editing a column filter.
//!
//! The cursor is a char index, so multi-byte input edits cleanly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The text changed.
    Changed,
    /// Only the cursor moved, or nothing happened.
    Unchanged,
    /// Enter or Esc: stop editing.
    Done,
}

/// A filter text input.
#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    value: String,
    cursor: usize,
}

impl FilterInput {
    /// Start editing `value` with the cursor at the end.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert pasted text at the cursor, dropping line breaks.
    pub fn paste(&mut self, text: &str) -> InputOutcome {
        let mut changed = false;
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
            changed = true;
        }
        if changed {
            InputOutcome::Changed
        } else {
            InputOutcome::Unchanged
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> InputOutcome {
        let len = self.value.chars().count();
        match (key.code, key.modifiers) {
            (KeyCode::Enter | KeyCode::Esc, _) => InputOutcome::Done,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if self.value.is_empty() {
                    return InputOutcome::Unchanged;
                }
                self.value.clear();
                self.cursor = 0;
                InputOutcome::Changed
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                InputOutcome::Changed
            }
            (KeyCode::Backspace, _) if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_char(self.cursor);
                InputOutcome::Changed
            }
            (KeyCode::Delete, _) if self.cursor < len => {
                self.remove_char(self.cursor);
                InputOutcome::Changed
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                InputOutcome::Unchanged
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(len);
                InputOutcome::Unchanged
            }
            (KeyCode::Home, _) => {
                self.cursor = 0;
                InputOutcome::Unchanged
            }
            (KeyCode::End, _) => {
                self.cursor = len;
                InputOutcome::Unchanged
            }
            _ => InputOutcome::Unchanged,
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn remove_char(&mut self, char_index: usize) {
        let at = self.byte_index(char_index);
        self.value.remove(at);
    }
}
