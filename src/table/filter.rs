//! Column filter predicates.
//!
//! A predicate receives every row entering its column's filter pass and
//! returns the subset that matches, in input order. Predicates must be pure
//! and must return their input unchanged when the filter value is empty
//! (see [`is_empty_filter`]).

use serde_json::Value;

use super::engine::RowId;
use super::value::{contains_text, display_value};

/// The value typed into a column's filter control.
///
/// Opaque to the engine; only the column's predicate interprets it.
pub type FilterValue = Value;

/// Whether a filter value means "no filter".
///
/// `null`, the empty string and the empty list are all empty.
pub fn is_empty_filter(value: &FilterValue) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// A row as seen by a filter predicate.
#[derive(Debug)]
pub struct FilterRow<'a, T> {
    /// Position of the row in the raw dataset.
    pub id: RowId,
    /// The original row.
    pub original: &'a T,
    /// The filtered column's value for this row.
    pub value: &'a Value,
}

impl<T> Clone for FilterRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FilterRow<'_, T> {}

/// The contract a column filter satisfies.
pub trait FilterPredicate<T>: Send + Sync {
    /// Return the rows matching `filter_value`, preserving input order.
    fn filter<'a>(
        &self,
        rows: &[FilterRow<'a, T>],
        column_id: &str,
        filter_value: &FilterValue,
    ) -> Vec<FilterRow<'a, T>>;
}

/// Substring match against the stringified column value.
///
/// This is the predicate every column gets unless it declares its own.
/// Matching is case-insensitive by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilter {
    case_sensitive: bool,
}

impl TextFilter {
    /// Create a case-insensitive text filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text filter that respects case.
    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl<T> FilterPredicate<T> for TextFilter {
    fn filter<'a>(
        &self,
        rows: &[FilterRow<'a, T>],
        _column_id: &str,
        filter_value: &FilterValue,
    ) -> Vec<FilterRow<'a, T>> {
        if is_empty_filter(filter_value) {
            return rows.to_vec();
        }
        let needle = display_value(filter_value);
        rows.iter()
            .filter(|row| contains_text(&display_value(row.value), &needle, self.case_sensitive))
            .copied()
            .collect()
    }
}

/// Filter for list-valued columns.
///
/// Keeps a row when any item of its list has `label_field` containing the
/// filter text (case-insensitive). Rows with an empty or absent list drop out
/// as soon as the filter is non-empty.
#[derive(Debug, Clone)]
pub struct ListContainsFilter {
    label_field: String,
}

impl ListContainsFilter {
    /// Match against the given field of each list item.
    pub fn new(label_field: impl Into<String>) -> Self {
        Self {
            label_field: label_field.into(),
        }
    }

    /// The item field being matched.
    pub fn label_field(&self) -> &str {
        &self.label_field
    }

    fn item_matches(&self, item: &Value, needle: &str) -> bool {
        item.get(&self.label_field)
            .map(|label| contains_text(&display_value(label), needle, false))
            .unwrap_or(false)
    }
}

impl<T> FilterPredicate<T> for ListContainsFilter {
    fn filter<'a>(
        &self,
        rows: &[FilterRow<'a, T>],
        _column_id: &str,
        filter_value: &FilterValue,
    ) -> Vec<FilterRow<'a, T>> {
        if is_empty_filter(filter_value) {
            return rows.to_vec();
        }
        let needle = display_value(filter_value);
        rows.iter()
            .filter(|row| {
                row.value
                    .as_array()
                    .is_some_and(|items| items.iter().any(|item| self.item_matches(item, &needle)))
            })
            .copied()
            .collect()
    }
}

/// Adapts a per-value test into a [`FilterPredicate`].
///
/// The closure only sees non-empty filter values; empty ones pass every row.
pub struct MatchFilter<F> {
    matches: F,
}

impl<F> MatchFilter<F>
where
    F: Fn(&Value, &FilterValue) -> bool + Send + Sync,
{
    /// Wrap a `(cell value, filter value) -> keep?` closure.
    pub fn new(matches: F) -> Self {
        Self { matches }
    }
}

impl<T, F> FilterPredicate<T> for MatchFilter<F>
where
    F: Fn(&Value, &FilterValue) -> bool + Send + Sync,
{
    fn filter<'a>(
        &self,
        rows: &[FilterRow<'a, T>],
        _column_id: &str,
        filter_value: &FilterValue,
    ) -> Vec<FilterRow<'a, T>> {
        if is_empty_filter(filter_value) {
            return rows.to_vec();
        }
        rows.iter()
            .filter(|row| (self.matches)(row.value, filter_value))
            .copied()
            .collect()
    }
}
