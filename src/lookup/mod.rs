//! Detail lookup collaborators.
//!
//! Row activation asks a [`DetailLookup`] for the richer record behind a
//! clicked row. [`HttpDetailLookup`] fetches it from a REST service;
//! [`RowEcho`] hands the row back unchanged for offline datasets.

mod client;
pub mod error;

use async_trait::async_trait;

pub use client::HttpDetailLookup;
pub use error::LookupError;

/// Fetches the detail object for a row.
#[async_trait]
pub trait DetailLookup<T>: Send + Sync {
    /// The detail object produced on success.
    type Detail: Send + 'static;

    /// Fetch the detail for `row`, a row of type `row_type`.
    async fn lookup_detail(&self, row: &T, row_type: &str) -> error::Result<Self::Detail>;
}

/// Lookup that returns the row itself as its detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowEcho;

#[async_trait]
impl<T> DetailLookup<T> for RowEcho
where
    T: Clone + Send + Sync + 'static,
{
    type Detail = T;

    async fn lookup_detail(&self, row: &T, _row_type: &str) -> error::Result<T> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_row_echo_returns_row() {
        let row = json!({"course_id": "c1", "title": "Algebra"});
        let detail = RowEcho.lookup_detail(&row, "courses").await.unwrap();
        assert_eq!(detail, row);
    }
}
