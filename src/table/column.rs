//! Column declarations.
//!
//! A [`ColumnSpec`] names a column, says how to pull its value out of a row,
//! and optionally overrides the filter predicate and the cell renderer. Entity
//! tables supply an ordered list of these to the engine.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::engine::CellKey;
use super::expandable::ExpandableList;
use super::filter::{FilterPredicate, TextFilter};
use super::value::display_value;

/// Pulls a column's value out of a row.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Renders one cell from its row and resolved value.
pub type CellRenderer<T> = Arc<dyn Fn(&CellArgs<'_, T>) -> CellContent + Send + Sync>;

/// Rows whose fields can be looked up by name.
pub trait RowRecord {
    /// The named field, or `None` when absent.
    fn field(&self, name: &str) -> Option<&Value>;
}

impl RowRecord for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl RowRecord for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Everything a cell renderer gets to look at.
#[derive(Debug)]
pub struct CellArgs<'a, T> {
    /// Identity of the cell being rendered.
    pub key: &'a CellKey,
    /// The original row.
    pub row: &'a T,
    /// The column's resolved value for this row.
    pub value: &'a Value,
}

/// What a rendered cell displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Plain text.
    Text(String),
    /// An expandable inline list.
    List(ExpandableList),
}

impl CellContent {
    /// Rendered lines of the cell.
    pub fn lines(&self) -> Vec<String> {
        match self {
            CellContent::Text(text) => vec![text.clone()],
            CellContent::List(list) => list.lines(),
        }
    }

    /// The inner list, if this cell renders one.
    pub fn as_list(&self) -> Option<&ExpandableList> {
        match self {
            CellContent::List(list) => Some(list),
            CellContent::Text(_) => None,
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// Declaration of one table column.
pub struct ColumnSpec<T> {
    header: String,
    accessor: Accessor<T>,
    filter: Arc<dyn FilterPredicate<T>>,
    renderer: Option<CellRenderer<T>>,
    filterable: bool,
    sortable: bool,
}

impl<T> ColumnSpec<T> {
    /// Create a column reading its value with `accessor`.
    ///
    /// The column filters with [`TextFilter`] and renders the stringified
    /// value until told otherwise.
    pub fn new<F>(header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            accessor: Arc::new(accessor),
            filter: Arc::new(TextFilter::new()),
            renderer: None,
            filterable: true,
            sortable: true,
        }
    }

    /// Use a custom filter predicate for this column.
    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: FilterPredicate<T> + 'static,
    {
        self.filter = Arc::new(predicate);
        self
    }

    /// Use a custom cell renderer for this column.
    pub fn with_cell<R>(mut self, renderer: R) -> Self
    where
        R: Fn(&CellArgs<'_, T>) -> CellContent + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Hide the filter control and reject filter values for this column.
    pub fn disable_filter(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Ignore header toggles for this column.
    pub fn disable_sort(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Column identity. Headers are unique within an engine.
    pub fn id(&self) -> &str {
        &self.header
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn can_filter(&self) -> bool {
        self.filterable
    }

    pub fn can_sort(&self) -> bool {
        self.sortable
    }

    /// The predicate used for this column's filter pass.
    pub fn predicate(&self) -> &dyn FilterPredicate<T> {
        self.filter.as_ref()
    }

    /// Resolve this column's value for a row.
    pub fn resolve(&self, row: &T) -> Value {
        (self.accessor)(row)
    }

    /// Render a cell, falling back to the stringified value.
    pub fn render(&self, args: &CellArgs<'_, T>) -> CellContent {
        match &self.renderer {
            Some(renderer) => renderer(args),
            None => CellContent::Text(display_value(args.value)),
        }
    }
}

impl<T: RowRecord + 'static> ColumnSpec<T> {
    /// A column reading the named field. Absent fields resolve to `null`.
    pub fn field(header: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(header, move |row: &T| {
            row.field(&name).cloned().unwrap_or(Value::Null)
        })
    }
}

impl<T> Clone for ColumnSpec<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            filter: Arc::clone(&self.filter),
            renderer: self.renderer.clone(),
            filterable: self.filterable,
            sortable: self.sortable,
        }
    }
}

impl<T> fmt::Debug for ColumnSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("header", &self.header)
            .field("custom_renderer", &self.renderer.is_some())
            .field("filterable", &self.filterable)
            .field("sortable", &self.sortable)
            .finish()
    }
}
