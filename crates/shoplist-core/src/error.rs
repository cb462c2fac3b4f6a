//! Error types for shoplist-core

use thiserror::Error;

/// Result type alias using shoplist-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shoplist-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote sync failure
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Whether a sync attempt that failed with this error may be retried.
    ///
    /// Only remote failures are transient; store and lookup errors are final.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this error came from the local store.
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::LibSql(_) | Self::Io(_))
    }
}
