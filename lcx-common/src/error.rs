//! Common error types for LCX

use thiserror::Error;

/// Common result type for LCX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LCX services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored record does not match the response model
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
