//! Error types for the bmi_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bmi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input rejected before any computation
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Username or entry not present in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Not enough records to build a trend
    #[error("Need at least {required} entries to show trends (have {actual})")]
    InsufficientData { required: usize, actual: usize },

    /// Persisted document does not match the expected layout
    #[error("Schema error: {0}")]
    Schema(String),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True when the failure came from writing or encoding persisted state,
    /// as opposed to a logical failure such as a missing user.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Json(_))
    }
}
