//! Exact cosine-similarity store held in memory.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use search_embeddings::Embedding;
use search_types::Metadata;

use crate::error::VectorError;
use crate::index::{VectorAdapter, VectorHit, VectorItem};

#[derive(Debug)]
struct Entry {
    vector: Embedding,
    metadata: Option<Metadata>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    dimension: Option<usize>,
}

/// Brute-force vector store. The first stored vector fixes the dimension.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<Inner>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a fixed dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                dimension: Some(dimension),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.read().dimension
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl VectorAdapter for InMemoryVectorStore {
    async fn store_batch(&self, items: Vec<VectorItem>) -> Result<(), VectorError> {
        let mut inner = self.write();

        // Validate the whole batch before inserting anything
        let expected = inner
            .dimension
            .or_else(|| items.first().map(|i| i.vector.dimension()));
        if let Some(expected) = expected {
            if let Some(bad) = items.iter().find(|i| i.vector.dimension() != expected) {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: bad.vector.dimension(),
                });
            }
        }

        inner.dimension = expected;
        let count = items.len();
        for item in items {
            inner.entries.insert(
                item.id,
                Entry {
                    vector: item.vector,
                    metadata: item.metadata,
                },
            );
        }
        debug!(count, total = inner.entries.len(), "Stored vectors");
        Ok(())
    }

    async fn search(&self, query: &Embedding, limit: usize) -> Result<Vec<VectorHit>, VectorError> {
        let inner = self.read();
        if let Some(expected) = inner.dimension {
            if query.dimension() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: query.dimension(),
                });
            }
        }

        let mut hits: Vec<VectorHit> = inner
            .entries
            .iter()
            .map(|(id, entry)| VectorHit {
                id: id.clone(),
                score: query.cosine_similarity(&entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<(), VectorError> {
        let mut inner = self.write();
        let before = inner.entries.len();
        for id in ids {
            inner.entries.remove(id);
        }
        debug!(removed = before - inner.entries.len(), "Deleted vectors");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, values: Vec<f32>) -> VectorItem {
        VectorItem::new(id, Embedding::new(values))
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .store_batch(vec![
                item("x", vec![1.0, 0.0]),
                item("y", vec![0.7, 0.7]),
                item("z", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&Embedding::new(vec![1.0, 0.1]), 10).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);

        let hits = store.search(&Embedding::new(vec![1.0, 0.1]), 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_store_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        store.store_batch(vec![item("a", vec![1.0, 0.0])]).await.unwrap();
        store.store_batch(vec![item("a", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(store.len(), 1);

        let hits = store.search(&Embedding::new(vec![0.0, 1.0]), 1).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejects_whole_batch() {
        let store = InMemoryVectorStore::with_dimension(2);
        let err = store
            .store_batch(vec![item("a", vec![1.0, 0.0]), item("b", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(store.is_empty());

        let err = store.search(&Embedding::new(vec![1.0, 0.0, 0.0]), 1).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_first_batch_fixes_dimension() {
        let store = InMemoryVectorStore::new();
        assert_eq!(store.dimension(), None);
        store.store_batch(vec![item("a", vec![1.0, 0.0, 0.0])]).await.unwrap();
        assert_eq!(store.dimension(), Some(3));
        assert!(store.store_batch(vec![item("b", vec![1.0])]).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_batch_ignores_unknown() {
        let store = InMemoryVectorStore::new();
        store
            .store_batch(vec![item("a", vec![1.0]), item("b", vec![1.0])])
            .await
            .unwrap();
        store
            .delete_batch(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert!(!store.contains("a"));
        assert!(store.contains("b"));
    }

    #[tokio::test]
    async fn test_metadata_round_trips_through_search() {
        let store = InMemoryVectorStore::new();
        let mut metadata = Metadata::new();
        metadata.insert("path".to_string(), "/a.txt".into());
        store
            .store_batch(vec![item("a", vec![1.0]).with_metadata(metadata)])
            .await
            .unwrap();

        let hits = store.search(&Embedding::new(vec![1.0]), 1).await.unwrap();
        assert_eq!(hits[0].metadata_path(), Some("/a.txt"));
    }
}
