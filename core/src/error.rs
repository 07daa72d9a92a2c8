use std::io;
use thiserror::Error;

/// Errors raised while saving or restoring a persisted index.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON record: a missing top-level key or a wrong value shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary decode error: {0}")]
    Binary(#[from] bincode::Error),

    /// The record parsed but describes an inconsistent index.
    #[error("invalid index record: {0}")]
    InvalidRecord(String),
}
