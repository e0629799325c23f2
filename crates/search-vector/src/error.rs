//! Vector store error types.

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Vector size differs from the store's dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Backend rejected or failed the operation
    #[error("Vector store error: {0}")]
    Store(String),

    /// Failure reported by a caller-supplied adapter
    #[error("Vector adapter error: {0}")]
    Adapter(String),
}
