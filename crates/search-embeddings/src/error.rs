//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while producing embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// HTTP transport failure
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Embedding API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Endpoint throttled the request
    #[error("Embedding API rate limit exceeded")]
    RateLimited,

    /// Response body could not be interpreted
    #[error("Failed to parse embedding response: {0}")]
    Parse(String),

    /// Adapter configuration is incomplete
    #[error("Embedding configuration error: {0}")]
    Config(String),

    /// Returned vector count differs from the input count
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// Returned vector has an unexpected size
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Failure reported by a caller-supplied adapter
    #[error("Embedding adapter error: {0}")]
    Adapter(String),
}
