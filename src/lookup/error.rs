//! Detail lookup error types.

use thiserror::Error;

/// Errors that can occur while fetching a detail object.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The detail service has no record for this row.
    #[error("Detail not found: {0}")]
    NotFound(String),

    /// The row lacks the field used to address its detail.
    #[error("Row has no '{field}' field to look up {row_type} details")]
    MissingId { row_type: String, field: String },

    /// Authentication or permission failure.
    #[error("Access denied: {0}")]
    Denied(String),

    /// Rate limited by the detail service.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Detail service error.
    #[error("Detail service error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not a usable detail object.
    #[error("Invalid detail response: {0}")]
    InvalidResponse(String),
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 | 403 => LookupError::Denied(context.to_string()),
            404 => LookupError::NotFound(context.to_string()),
            429 => LookupError::RateLimited,
            500..=599 => LookupError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => LookupError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LookupError::RateLimited | LookupError::ServerError(_) | LookupError::Network(_)
        )
    }
}
