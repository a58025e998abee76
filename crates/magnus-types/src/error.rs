//! Error types shared across the Magnus crates

use thiserror::Error;

/// Result type for Magnus operations
pub type Result<T> = std::result::Result<T, MagnusError>;

/// Errors surfaced by the foundation layer
#[derive(Debug, Clone, Error)]
pub enum MagnusError {
    /// An identifier did not match any known record
    #[error("Record {id} not found")]
    NotFound { id: String },

    /// A payload field failed validation
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A snapshot could not be interpreted
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}
