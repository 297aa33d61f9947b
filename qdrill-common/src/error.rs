//! Common error types for QDrill

use crate::validation::FieldErrors;
use thiserror::Error;

/// Common result type for QDrill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across QDrill crates
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

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload failed one or more field checks
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Internal error (corrupt stored data, unexpected server reply)
    #[error("Internal error: {0}")]
    Internal(String),
}
