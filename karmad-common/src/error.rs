//! Common error types for karmad

use thiserror::Error;

/// Common result type for karmad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the karmad crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON record could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested song, madlib or template not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input (bad id, unknown filling key, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
