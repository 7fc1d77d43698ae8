//! Error types for bindql

use thiserror::Error;

/// Result type alias for bindql operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A caller supplied value the builder or connection cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the database adapter
    #[error("Adapter error: {0}")]
    Adapter(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap a driver error (or plain message) coming out of an adapter
    pub fn adapter(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Adapter(source.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
