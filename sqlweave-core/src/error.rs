//! Error types for sqlweave

use thiserror::Error;

/// The main error type for sqlweave operations
#[derive(Error, Debug)]
pub enum Error {
    /// Driver-reported failure, passed through untouched
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Caller input that cannot be turned into SQL (bad alias map, empty IN list, ...)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A statement-kind precondition was violated at render time
    #[error("Logic error: {message}")]
    Logic { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid connection configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A statement ran past the configured timeout
    #[error("Statement timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Convenience Result type for sqlweave operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new logic error
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub fn is_logic(&self) -> bool {
        matches!(self, Self::Logic { .. })
    }
}
