//! Vector adapter trait and types.

use async_trait::async_trait;

use search_embeddings::Embedding;
use search_types::Metadata;

use crate::error::VectorError;

/// A vector to store, keyed by document id.
#[derive(Debug, Clone)]
pub struct VectorItem {
    pub id: String,
    pub vector: Embedding,
    pub metadata: Option<Metadata>,
}

impl VectorItem {
    pub fn new(id: impl Into<String>, vector: Embedding) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A nearest-neighbour match.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    /// Similarity, higher is closer; range is adapter-defined
    pub score: f32,
    pub metadata: Option<Metadata>,
}

impl VectorHit {
    /// `metadata.path` when present as a string.
    pub fn metadata_path(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("path")?.as_str()
    }
}

/// Storage and similarity search for document vectors.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait VectorAdapter: Send + Sync {
    /// Insert or replace vectors by id.
    async fn store_batch(&self, items: Vec<VectorItem>) -> Result<(), VectorError>;

    /// Return up to `limit` hits, best first.
    async fn search(&self, query: &Embedding, limit: usize) -> Result<Vec<VectorHit>, VectorError>;

    /// Delete vectors by id; unknown ids are ignored.
    async fn delete_batch(&self, ids: &[String]) -> Result<(), VectorError>;
}
