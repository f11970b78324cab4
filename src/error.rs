//! Error types for Pulse Score
//!
//! The scoring engine itself is infallible; these errors only surface at the
//! crate's edges (document parsing, configuration, encoding).

use thiserror::Error;

/// Errors that can occur while preparing input for, or encoding output of, the engine
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse log payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
