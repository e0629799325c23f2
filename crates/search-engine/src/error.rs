//! Search engine error types.

use thiserror::Error;

use search_embeddings::EmbeddingError;
use search_storage::StorageError;
use search_types::ConfigError;
use search_vector::VectorError;

/// Message returned when a vector mode is requested without both adapters.
pub const VECTOR_NOT_CONFIGURED: &str = "Vector search is not configured for this workspace.";

/// Errors returned by [`WorkspaceSearch`](crate::WorkspaceSearch) calls.
///
/// Per-file and vector-indexing failures during indexing are not errors;
/// they are reported in `IndexSummary::errors`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid configuration or a mode the instance cannot serve
    #[error("{0}")]
    Configuration(String),

    /// Embedding adapter failed during a query
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Vector adapter failed during a query or deletion
    #[error(transparent)]
    Vector(#[from] VectorError),

    /// Document store failure outside per-file indexing
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Malformed base path or glob in search options
    #[error("Invalid search filter: {0}")]
    InvalidFilter(String),

    /// Instance was destroyed
    #[error("Workspace search has been destroyed.")]
    Destroyed,
}

impl From<ConfigError> for SearchError {
    fn from(err: ConfigError) -> Self {
        SearchError::Configuration(err.to_string())
    }
}

impl SearchError {
    pub(crate) fn vector_not_configured() -> Self {
        SearchError::Configuration(VECTOR_NOT_CONFIGURED.to_string())
    }
}
