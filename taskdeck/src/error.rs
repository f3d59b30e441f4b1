//! Error types for TaskDeck
//!
//! All errors use thiserror for structured error handling.
//! The HTTP layer maps them onto status codes in `routes::ApiError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing, malformed, forged or expired credential
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Record absent or owned by someone else
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A local cache slot holds data that does not parse
    #[error("Corrupted storage slot '{key}': {reason}")]
    CorruptSlot { key: String, reason: String },

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
