//! Storage error types.

use thiserror::Error;

/// Errors that can occur while listing or reading documents.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Glob pattern failed to compile
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] globset::Error),

    /// Path does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path escapes the store root
    #[error("Path outside store root: {0}")]
    OutsideRoot(String),

    /// File content is not valid UTF-8
    #[error("Not valid UTF-8 text: {0}")]
    Encoding(String),

    /// Directory traversal failed
    #[error("Walk error: {0}")]
    Walk(String),
}
