//! Table engine error types.

use thiserror::Error;

/// Errors returned by [`TableEngine`](super::TableEngine) operations.
///
/// These describe misuse of the engine (bad column declarations, unknown
/// identities). Missing or malformed row fields are never errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// Two columns share the same header.
    #[error("Duplicate column header: {0}")]
    DuplicateColumn(String),

    /// No column has this id.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// No row exists at this position in the dataset.
    #[error("Unknown row: {0}")]
    UnknownRow(usize),

    /// The column opted out of filtering.
    #[error("Column '{0}' cannot be filtered")]
    FilterDisabled(String),

    /// The column opted out of sorting.
    #[error("Column '{0}' cannot be sorted")]
    SortDisabled(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
