//! Error types for the video controls bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the native element or document, or by invalid defaults.
///
/// An unbound element is never an error: reads fall back to defaults and
/// writes and actions quietly do nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The user agent refused the request (autoplay policy, fullscreen denied, ...)
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// The element or document does not support the request
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The request does not make sense in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
