//! Insight engine error types

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

