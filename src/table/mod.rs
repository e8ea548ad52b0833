//! Generic table engine.
//!
//! This module is headless: it turns column declarations and rows into
//! headers, ordered and filtered rows, and rendered cells, without knowing
//! anything about the terminal.

mod column;
mod engine;
mod error;
mod expandable;
mod filter;
mod value;

pub use column::{Accessor, CellArgs, CellContent, CellRenderer, ColumnSpec, RowRecord};
pub use engine::{
    CellKey, FilterControl, FilterState, FilterVisibility, HeaderCell, RenderedCell, RowId,
    SortDirection, SortState, TableEngine,
};
pub use error::TableError;
pub use expandable::{ExpandState, ExpandableList, ListEntry};
pub use filter::{
    is_empty_filter, FilterPredicate, FilterRow, FilterValue, ListContainsFilter, MatchFilter,
    TextFilter,
};
pub use value::{compare_values, display_value};
