//! Error types for document store operations

use crate::error::AppError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to the document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Search request failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Write request failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Could not reach the store
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            StoreError::CollectionNotFound(msg) => AppError::NotFound(msg),
            StoreError::Timeout(msg) => AppError::Timeout(msg),
            StoreError::ConnectionFailed(msg) => AppError::Network(msg),
            _ => AppError::Store(err.to_string()),
        }
    }
}
