//! Expandable inline list rendered inside a table cell.
//!
//! An [`ExpandableList`] shows a toggle like `▶ Courses (3)` and, once
//! expanded, the label of every item. An empty list renders a static
//! `No Courses` placeholder and has no toggle at all.

use serde_json::Value;

use super::value::display_value;

/// Indicator shown while the list is expanded.
pub const EXPANDED_INDICATOR: char = '▼';

/// Indicator shown while the list is collapsed.
pub const COLLAPSED_INDICATOR: char = '▶';

/// Visibility of an expandable list's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandState {
    /// Items hidden (initial state).
    #[default]
    Collapsed,
    /// Items shown.
    Expanded,
}

impl ExpandState {
    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            ExpandState::Collapsed => ExpandState::Expanded,
            ExpandState::Expanded => ExpandState::Collapsed,
        }
    }

    /// The toggle indicator for this state.
    pub fn indicator(self) -> char {
        match self {
            ExpandState::Collapsed => COLLAPSED_INDICATOR,
            ExpandState::Expanded => EXPANDED_INDICATOR,
        }
    }
}

/// One list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Composite `"<item key>-<position>"`, unique even when item keys repeat.
    pub key: String,
    /// Text shown for the item.
    pub label: String,
}

/// A labelled list that can be expanded and collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandableList {
    label: String,
    entries: Vec<ListEntry>,
    state: ExpandState,
}

impl ExpandableList {
    /// Build a list from arbitrary items.
    pub fn new<I>(
        items: &[I],
        label: impl Into<String>,
        item_key: impl Fn(&I) -> String,
        item_label: impl Fn(&I) -> String,
    ) -> Self {
        let entries = items
            .iter()
            .enumerate()
            .map(|(index, item)| ListEntry {
                key: format!("{}-{}", item_key(item), index),
                label: item_label(item),
            })
            .collect();
        Self {
            label: label.into(),
            entries,
            state: ExpandState::Collapsed,
        }
    }

    /// Build a list from a JSON list of records.
    ///
    /// `item_key` and `item_label` name the fields read from each record.
    /// Anything that is not a list is treated as an empty list.
    pub fn from_value(value: &Value, label: impl Into<String>, item_key: &str, item_label: &str) -> Self {
        let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let field = |item: &Value, name: &str| item.get(name).map(display_value).unwrap_or_default();
        Self::new(
            items,
            label,
            |item| field(item, item_key),
            |item| field(item, item_label),
        )
    }

    /// Replace the expansion state. Ignored for empty lists.
    pub fn with_state(mut self, state: ExpandState) -> Self {
        if !self.is_empty() {
            self.state = state;
        }
        self
    }

    /// Flip between collapsed and expanded.
    ///
    /// Returns `false` without changing anything when the list is empty,
    /// since an empty list has no toggle.
    pub fn toggle(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.state = self.state.toggled();
        true
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> ExpandState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpandState::Expanded
    }

    /// All entries, regardless of state.
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Text of the toggle control, or `None` for an empty list.
    pub fn toggle_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format!(
            "{} {} ({})",
            self.state.indicator(),
            self.label,
            self.entries.len()
        ))
    }

    /// Placeholder shown instead of the toggle when the list is empty.
    pub fn placeholder(&self) -> Option<String> {
        self.is_empty().then(|| format!("No {}", self.label))
    }

    /// Entries currently shown: all of them when expanded, none otherwise.
    pub fn visible_entries(&self) -> &[ListEntry] {
        if self.is_expanded() {
            &self.entries
        } else {
            &[]
        }
    }

    /// The rendered lines: toggle (or placeholder) followed by visible items.
    pub fn lines(&self) -> Vec<String> {
        let head = self
            .toggle_text()
            .or_else(|| self.placeholder())
            .unwrap_or_default();
        std::iter::once(head)
            .chain(self.visible_entries().iter().map(|e| format!("  • {}", e.label)))
            .collect()
    }
}
