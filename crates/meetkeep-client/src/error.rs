//! Client error types.

use thiserror::Error;

use meetkeep_core::{TimeParseError, TracingError};
use meetkeep_service::ServiceError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A meeting operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// User typed something that is not a valid date or time.
    #[error(transparent)]
    Parse(#[from] TimeParseError),

    /// User typed something else that could not be understood.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Standard input was closed.
    #[error("input closed")]
    InputClosed,

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
