//! Error types for Toolgate storage

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already registered: {0}")]
    Conflict(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        StoreError::Database(err.to_string())
    }
}

/// Result type alias for repository operations
pub type StoreResult<T> = Result<T, StoreError>;
