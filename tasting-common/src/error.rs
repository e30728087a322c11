//! Common error types for the tasting services

use thiserror::Error;

/// Common result type for tasting operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the tasting services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record does not exist (e.g. usage increment for an unknown wine)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failure inside a store that has no more specific variant
    #[error("Internal error: {0}")]
    Internal(String),
}
