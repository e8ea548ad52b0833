//! Centralized error types for rostergrid.
//!
//! Each subsystem owns a `thiserror` enum; [`AppError`] aggregates them for
//! the front end and maps each to a message fit for a toast.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lookup::LookupError;
use crate::table::TableError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Detail lookup errors.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// Table engine misuse or invalid column declarations.
    #[error("{0}")]
    Table(#[from] TableError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset file is not usable.
    #[error("Invalid dataset: {0}")]
    Data(String),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Data(err.to_string())
    }
}

impl AppError {
    /// Create a dataset error.
    pub fn data(msg: impl Into<String>) -> Self {
        AppError::Data(msg.into())
    }

    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check it is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Lookup(e) => match e {
                LookupError::NotFound(what) => format!("No details found for '{}'.", what),
                LookupError::MissingId { row_type, field } => {
                    format!("This {} row has no '{}' to look up.", row_type, field)
                }
                LookupError::Denied(_) => {
                    "Access denied by the detail service.".to_string()
                }
                LookupError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                LookupError::ServerError(_) => {
                    "Detail service error. Please try again later.".to_string()
                }
                LookupError::Network(_) => {
                    "Connection failed. Please check your network and service URL.".to_string()
                }
                LookupError::InvalidResponse(_) => {
                    "Unexpected response from the detail service.".to_string()
                }
            },
            AppError::Table(e) => e.to_string(),
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Data(msg) => format!("Could not load dataset: {}", msg),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
