//! Reconciler-specific error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcilerError {
    #[error("Shared storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },

    #[error("Storage operation failed: {operation} on {key}: {reason}")]
    StorageError {
        operation: String,
        key: String,
        reason: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReconcilerResult<T> = Result<T, ReconcilerError>;
