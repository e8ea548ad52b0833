//! Headless table engine.
//!
//! [`TableEngine`] owns the rows, the column declarations, the sort state and
//! the per-column filter state, and derives the visible rows from them:
//!
//! ```text
//! visible = sort(filter(rows, filters), sort)
//! ```
//!
//! Filters run first, one column at a time in column order, each over the
//! survivors of the previous columns (so active filters combine with AND).
//! The single active sort is applied on top of the filtered rows with a
//! stable comparator. The derived view is memoized and only recomputed after
//! the rows, the filters or the sort change.

use std::cell::{Cell, OnceCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use super::column::{CellArgs, CellContent, ColumnSpec};
use super::error::{Result, TableError};
use super::expandable::ExpandState;
use super::filter::{is_empty_filter, FilterRow, FilterValue};
use super::value::{compare_values, display_value};

/// Position of a row in the raw dataset.
///
/// Stable while the dataset is unchanged, whatever the sort and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one cell: a raw row and a column id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: RowId,
    pub column: String,
}

impl CellKey {
    pub fn new(row: RowId, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Glyph appended to the header label.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "  ▲",
            SortDirection::Descending => "  ▼",
        }
    }
}

/// The single active sort, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted {
        column: String,
        direction: SortDirection,
    },
}

impl SortState {
    /// The state after the user toggles `column`'s header.
    ///
    /// The same column cycles ascending, descending, unsorted. Any other
    /// column starts over at ascending.
    pub fn toggled(&self, column: &str) -> SortState {
        match self {
            SortState::Sorted {
                column: current,
                direction: SortDirection::Ascending,
            } if current == column => SortState::Sorted {
                column: column.to_string(),
                direction: SortDirection::Descending,
            },
            SortState::Sorted {
                column: current,
                direction: SortDirection::Descending,
            } if current == column => SortState::Unsorted,
            _ => SortState::Sorted {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            },
        }
    }

    /// The sorted column, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            SortState::Unsorted => None,
            SortState::Sorted { column, .. } => Some(column),
        }
    }

    /// Direction for `column`, or `None` when it is not the sorted column.
    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        match self {
            SortState::Sorted {
                column: current,
                direction,
            } if current == column => Some(*direction),
            _ => None,
        }
    }
}

/// Active filter values keyed by column id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: HashMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.values.get(column)
    }

    /// Upsert a filter value, removing the entry when the value is empty.
    ///
    /// Returns whether anything changed.
    pub fn set(&mut self, column: &str, value: FilterValue) -> bool {
        if is_empty_filter(&value) {
            return self.values.remove(column).is_some();
        }
        if self.values.get(column) == Some(&value) {
            return false;
        }
        self.values.insert(column.to_string(), value);
        true
    }

    /// Remove every filter. Returns whether any was active.
    pub fn clear(&mut self) -> bool {
        let had_filters = !self.values.is_empty();
        self.values.clear();
        had_filters
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Shared "filters on" flag.
///
/// Controls whether headers carry filter controls. Hiding the controls
/// leaves every active filter in place. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct FilterVisibility(Arc<AtomicBool>);

impl FilterVisibility {
    pub fn new(on: bool) -> Self {
        Self(Arc::new(AtomicBool::new(on)))
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::SeqCst);
    }

    /// Flip the flag and return the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}

impl Default for FilterVisibility {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A column's filter input as shown in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    /// Current filter text.
    pub value: String,
    /// Hint naming how many rows the filter searches.
    pub placeholder: String,
}

/// A rendered column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub label: String,
    /// Direction if this is the sorted column.
    pub sort: Option<SortDirection>,
    /// Present when filters are visible and the column can be filtered.
    pub filter: Option<FilterControl>,
}

impl HeaderCell {
    /// Sort glyph, empty when the column is not sorted.
    pub fn indicator(&self) -> &'static str {
        self.sort.map(SortDirection::indicator).unwrap_or("")
    }

    /// Label followed by the sort glyph.
    pub fn title(&self) -> String {
        format!("{}{}", self.label, self.indicator())
    }
}

/// A rendered body cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub key: CellKey,
    pub content: CellContent,
}

#[derive(Debug)]
struct DerivedView {
    rows: Vec<RowId>,
    /// Rows entering each column's filter pass, by column index.
    pre_filter_counts: Vec<usize>,
}

/// Sorting and filtering state machine for one table.
pub struct TableEngine<T> {
    columns: Vec<ColumnSpec<T>>,
    rows: Vec<T>,
    sort: SortState,
    filters: FilterState,
    filters_visible: FilterVisibility,
    expanded: HashMap<CellKey, ExpandState>,
    view: OnceCell<DerivedView>,
    derivations: Cell<usize>,
}

impl<T> TableEngine<T> {
    /// Create an engine over `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] when two columns share a header.
    pub fn new(
        columns: Vec<ColumnSpec<T>>,
        rows: Vec<T>,
        filters_visible: FilterVisibility,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id()) {
                return Err(TableError::DuplicateColumn(column.id().to_string()));
            }
        }

        debug!(columns = columns.len(), rows = rows.len(), "Creating table engine");

        Ok(Self {
            columns,
            rows,
            sort: SortState::Unsorted,
            filters: FilterState::new(),
            filters_visible,
            expanded: HashMap::new(),
            view: OnceCell::new(),
            derivations: Cell::new(0),
        })
    }

    // -------------------------------------------------------------------------
    // Columns and rows
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[ColumnSpec<T>] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnSpec<T>> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == column_id)
    }

    fn require_column(&self, column_id: &str) -> Result<&ColumnSpec<T>> {
        self.column(column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))
    }

    /// All rows in dataset order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&T> {
        self.rows.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the dataset.
    ///
    /// Row identities change, so every expanded list starts collapsed again.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        debug!(rows = rows.len(), "Replacing table rows");
        self.rows = rows;
        self.expanded.clear();
        self.invalidate();
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_value(&self, column_id: &str) -> Option<&FilterValue> {
        self.filters.get(column_id)
    }

    pub fn filters_visible(&self) -> &FilterVisibility {
        &self.filters_visible
    }

    /// Set a column's filter value. An empty value removes the filter.
    ///
    /// The sort state is left alone.
    pub fn set_filter(&mut self, column_id: &str, value: impl Into<FilterValue>) -> Result<()> {
        if !self.require_column(column_id)?.can_filter() {
            return Err(TableError::FilterDisabled(column_id.to_string()));
        }
        if self.filters.set(column_id, value.into()) {
            debug!(column = column_id, active = self.filters.len(), "Filter changed");
            self.invalidate();
        }
        Ok(())
    }

    /// Remove every active filter.
    pub fn clear_filters(&mut self) {
        if self.filters.clear() {
            debug!("Filters cleared");
            self.invalidate();
        }
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Advance the sort cycle for a column header.
    pub fn toggle_sort(&mut self, column_id: &str) -> Result<&SortState> {
        if !self.require_column(column_id)?.can_sort() {
            return Err(TableError::SortDisabled(column_id.to_string()));
        }
        self.sort = self.sort.toggled(column_id);
        debug!(column = column_id, sort = ?self.sort, "Sort toggled");
        self.invalidate();
        Ok(&self.sort)
    }

    // -------------------------------------------------------------------------
    // Derived view
    // -------------------------------------------------------------------------

    fn invalidate(&mut self) {
        self.view.take();
    }

    fn view(&self) -> &DerivedView {
        self.view.get_or_init(|| self.derive())
    }

    /// Identities of the visible rows, in display order.
    pub fn visible_row_ids(&self) -> &[RowId] {
        &self.view().rows
    }

    /// The visible rows, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = (RowId, &T)> + '_ {
        self.visible_row_ids()
            .iter()
            .map(move |&id| (id, &self.rows[id.0]))
    }

    pub fn visible_len(&self) -> usize {
        self.view().rows.len()
    }

    /// How many times the visible rows have been computed.
    pub fn derivation_count(&self) -> usize {
        self.derivations.get()
    }

    fn derive(&self) -> DerivedView {
        self.derivations.set(self.derivations.get() + 1);

        let values: Vec<Vec<Value>> = self
            .columns
            .iter()
            .map(|column| self.rows.iter().map(|row| column.resolve(row)).collect())
            .collect();

        let mut current: Vec<RowId> = (0..self.rows.len()).map(RowId).collect();
        let mut pre_filter_counts = Vec::with_capacity(self.columns.len());

        for (index, column) in self.columns.iter().enumerate() {
            pre_filter_counts.push(current.len());
            let Some(filter_value) = self.filters.get(column.id()) else {
                continue;
            };
            let candidates: Vec<FilterRow<'_, T>> = current
                .iter()
                .map(|&id| FilterRow {
                    id,
                    original: &self.rows[id.0],
                    value: &values[index][id.0],
                })
                .collect();
            current = column
                .predicate()
                .filter(&candidates, column.id(), filter_value)
                .into_iter()
                .map(|row| row.id)
                .collect();
        }

        if let SortState::Sorted { column, direction } = &self.sort {
            if let Some(index) = self.column_index(column) {
                let keys = &values[index];
                // sort_by is stable: equal keys keep their filtered order
                current.sort_by(|a, b| {
                    let ordering = compare_values(&keys[a.0], &keys[b.0]);
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                });
            }
        }

        trace!(
            visible = current.len(),
            total = self.rows.len(),
            "Derived visible rows"
        );

        DerivedView {
            rows: current,
            pre_filter_counts,
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render one column header.
    pub fn render_header(&self, column_id: &str) -> Result<HeaderCell> {
        let index = self
            .column_index(column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        Ok(self.header_at(index))
    }

    /// Render every header in column order.
    pub fn render_headers(&self) -> Vec<HeaderCell> {
        (0..self.columns.len()).map(|i| self.header_at(i)).collect()
    }

    fn header_at(&self, index: usize) -> HeaderCell {
        let column = &self.columns[index];
        let filter = (self.filters_visible.is_on() && column.can_filter()).then(|| {
            let searched = self.view().pre_filter_counts[index];
            FilterControl {
                value: self
                    .filters
                    .get(column.id())
                    .map(display_value)
                    .unwrap_or_default(),
                placeholder: format!("Search {} records...", searched),
            }
        });
        HeaderCell {
            column_id: column.id().to_string(),
            label: column.header().to_string(),
            sort: self.sort.direction_for(column.id()),
            filter,
        }
    }

    /// Render every cell of a row in column order.
    pub fn render_row(&self, row: RowId) -> Result<Vec<RenderedCell>> {
        let original = self.row(row).ok_or(TableError::UnknownRow(row.0))?;
        Ok(self
            .columns
            .iter()
            .map(|column| self.cell_for(row, original, column))
            .collect())
    }

    /// Render a single cell.
    pub fn render_cell(&self, row: RowId, column_id: &str) -> Result<RenderedCell> {
        let original = self.row(row).ok_or(TableError::UnknownRow(row.0))?;
        let column = self.require_column(column_id)?;
        Ok(self.cell_for(row, original, column))
    }

    fn cell_for(&self, row_id: RowId, row: &T, column: &ColumnSpec<T>) -> RenderedCell {
        let key = CellKey::new(row_id, column.id());
        let value = column.resolve(row);
        let content = match column.render(&CellArgs {
            key: &key,
            row,
            value: &value,
        }) {
            CellContent::List(list) => {
                CellContent::List(list.with_state(self.expand_state(&key)))
            }
            other => other,
        };
        RenderedCell { key, content }
    }

    // -------------------------------------------------------------------------
    // Expandable lists
    // -------------------------------------------------------------------------

    /// Expansion state of the list in a cell.
    pub fn expand_state(&self, key: &CellKey) -> ExpandState {
        self.expanded.get(key).copied().unwrap_or_default()
    }

    /// Press the expand toggle of a cell.
    ///
    /// Returns the new state, or `None` when the cell has no toggle (it does
    /// not render a list, or the list is empty).
    pub fn toggle_expanded(&mut self, key: &CellKey) -> Result<Option<ExpandState>> {
        let cell = self.render_cell(key.row, &key.column)?;
        match cell.content.as_list() {
            Some(list) if !list.is_empty() => {
                let next = list.state().toggled();
                self.expanded.insert(key.clone(), next);
                debug!(cell = %key, state = ?next, "Expandable list toggled");
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }
}

impl<T> fmt::Debug for TableEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("filters_visible", &self.filters_visible.is_on())
            .finish()
    }
}
