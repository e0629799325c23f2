//! Embedding adapter trait and vector type.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// A dense embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Wrap raw values as returned by the model.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity in [-1, 1]; 0 for mismatched sizes or zero vectors.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        dot / denom
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Embedding::new(values)
    }
}

/// Source of embeddings for documents and queries.
///
/// Implementations must be thread-safe (Send + Sync); one adapter is shared
/// by indexing and search.
#[async_trait]
pub trait EmbeddingAdapter: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Embed several texts, preserving order.
    /// Default implementation calls `embed` for each text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
