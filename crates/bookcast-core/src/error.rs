//! Centralized error types for Bookcast.

use thiserror::Error;

/// Main error type for Bookcast operations.
#[derive(Error, Debug)]
pub enum BookcastError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] bookcast_db::DbError),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Broadcast hub is not running")]
    HubClosed,
}

/// Result type for Bookcast operations.
pub type BookcastResult<T> = Result<T, BookcastError>;

impl BookcastError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
