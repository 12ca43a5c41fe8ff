//! Store error types
//!
//! Defines all errors that can occur in the storage layer.

use thiserror::Error;

/// Errors that can occur in the document store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite rejected a statement or the database is unreachable
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored row does not match its expected shape
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// Requested subject does not exist
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    /// A subject with this id is already registered
    #[error("Subject already exists: {0}")]
    SubjectExists(String),

    /// Subject profile failed validation
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    /// Event payload failed validation
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
