//! Embedding configuration variants.
//!
//! An embedding backend may be supplied as a ready adapter, a bare model id
//! or a full endpoint config. All three collapse into one
//! `Arc<dyn EmbeddingAdapter>` when the search instance is built.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiEmbedder, ApiEmbedderConfig};
use crate::error::EmbeddingError;
use crate::model::EmbeddingAdapter;

/// How the embedding backend was specified.
#[derive(Clone)]
pub enum EmbeddingSource {
    /// Caller-provided adapter, used as is
    Adapter(Arc<dyn EmbeddingAdapter>),
    /// Model id for the default OpenAI-compatible endpoint
    Model(String),
    /// Full endpoint configuration
    Config(ApiEmbedderConfig),
}

impl EmbeddingSource {
    /// Resolve into a concrete adapter.
    pub fn resolve(self) -> Result<Arc<dyn EmbeddingAdapter>, EmbeddingError> {
        match self {
            EmbeddingSource::Adapter(adapter) => Ok(adapter),
            EmbeddingSource::Model(model) => {
                debug!(model = %model, "Resolving embedding model id");
                Ok(Arc::new(ApiEmbedder::new(ApiEmbedderConfig::for_model(model))?))
            }
            EmbeddingSource::Config(config) => {
                debug!(model = %config.model, base_url = %config.base_url, "Resolving embedding config");
                Ok(Arc::new(ApiEmbedder::new(config)?))
            }
        }
    }
}

impl fmt::Debug for EmbeddingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingSource::Adapter(_) => f.write_str("Adapter(..)"),
            EmbeddingSource::Model(model) => f.debug_tuple("Model").field(model).finish(),
            EmbeddingSource::Config(config) => f.debug_tuple("Config").field(config).finish(),
        }
    }
}

impl From<Arc<dyn EmbeddingAdapter>> for EmbeddingSource {
    fn from(adapter: Arc<dyn EmbeddingAdapter>) -> Self {
        EmbeddingSource::Adapter(adapter)
    }
}

impl From<&str> for EmbeddingSource {
    fn from(model: &str) -> Self {
        EmbeddingSource::Model(model.to_string())
    }
}

impl From<String> for EmbeddingSource {
    fn from(model: String) -> Self {
        EmbeddingSource::Model(model)
    }
}

impl From<ApiEmbedderConfig> for EmbeddingSource {
    fn from(config: ApiEmbedderConfig) -> Self {
        EmbeddingSource::Config(config)
    }
}
