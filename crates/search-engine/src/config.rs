//! Constructor config and per-query options.

use std::fmt;
use std::sync::Arc;

use search_bm25::Bm25Params;
use search_embeddings::{ApiEmbedderConfig, EmbeddingSource};
use search_types::{
    HybridSettings, IndexTarget, SearchMode, Settings, DEFAULT_MAX_FILE_BYTES,
    DEFAULT_SNIPPET_LENGTH,
};
use search_vector::VectorAdapter;

/// Results returned when a query does not set `top_k`.
pub const DEFAULT_TOP_K: usize = 5;

/// Candidates fetched per signal, as a multiple of `top_k`.
pub const CANDIDATE_MULTIPLIER: usize = 5;

/// Default hybrid weight for each signal.
pub const DEFAULT_HYBRID_WEIGHT: f32 = 0.5;

/// Construction-time configuration for [`WorkspaceSearch`](crate::WorkspaceSearch).
#[derive(Clone)]
pub struct SearchConfig {
    pub bm25: Bm25Params,
    /// Embedding backend, resolved once at construction
    pub embedding: Option<EmbeddingSource>,
    pub vector: Option<Arc<dyn VectorAdapter>>,
    /// Targets indexed lazily by `init` or the first search
    pub auto_index: Vec<IndexTarget>,
    /// Per-file limit; 0 disables it
    pub max_file_bytes: u64,
    pub snippet_length: usize,
    /// Mode for queries that name none; derived from the adapters when unset
    pub default_mode: Option<SearchMode>,
    pub hybrid: HybridSettings,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            embedding: None,
            vector: None,
            auto_index: Vec::new(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            snippet_length: DEFAULT_SNIPPET_LENGTH,
            default_mode: None,
            hybrid: HybridSettings::default(),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("bm25", &self.bm25)
            .field("embedding", &self.embedding)
            .field("vector", &self.vector.as_ref().map(|_| ".."))
            .field("auto_index", &self.auto_index)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("snippet_length", &self.snippet_length)
            .field("default_mode", &self.default_mode)
            .field("hybrid", &self.hybrid)
            .finish()
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate loaded settings. The vector adapter is never configured
    /// from settings and must be attached with [`with_vector`](Self::with_vector).
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bm25: Bm25Params::new(settings.bm25.k1, settings.bm25.b),
            embedding: settings
                .embedding
                .as_ref()
                .map(|e| EmbeddingSource::Config(ApiEmbedderConfig::from_settings(e))),
            vector: None,
            auto_index: settings.auto_index.clone(),
            max_file_bytes: settings.max_file_bytes,
            snippet_length: settings.snippet_length,
            default_mode: settings.default_mode,
            hybrid: settings.hybrid,
        }
    }

    pub fn with_bm25(mut self, params: Bm25Params) -> Self {
        self.bm25 = params;
        self
    }

    pub fn with_embedding(mut self, source: impl Into<EmbeddingSource>) -> Self {
        self.embedding = Some(source.into());
        self
    }

    pub fn with_vector(mut self, vector: Arc<dyn VectorAdapter>) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn with_auto_index<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IndexTarget>,
    {
        self.auto_index = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn with_snippet_length(mut self, snippet_length: usize) -> Self {
        self.snippet_length = snippet_length;
        self
    }

    pub fn with_default_mode(mut self, mode: SearchMode) -> Self {
        self.default_mode = Some(mode);
        self
    }

    pub fn with_hybrid_weights(mut self, lexical: Option<f32>, vector: Option<f32>) -> Self {
        self.hybrid = HybridSettings {
            lexical_weight: lexical,
            vector_weight: vector,
        };
        self
    }
}

/// Options for a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Explicit mode; falls back to the instance default
    pub mode: Option<SearchMode>,
    /// Maximum results (default 5)
    pub top_k: Option<usize>,
    /// Floor on the composed score, clamped to [0, 1]
    pub min_score: Option<f32>,
    /// Base path prefix
    pub path: Option<String>,
    /// Glob relative to `path`
    pub glob: Option<String>,
    pub snippet_length: Option<usize>,
    pub lexical_weight: Option<f32>,
    pub vector_weight: Option<f32>,
    /// When false, `content` is blanked in results (snippets remain)
    pub include_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: None,
            top_k: None,
            min_score: None,
            path: None,
            glob: None,
            snippet_length: None,
            lexical_weight: None,
            vector_weight: None,
            include_content: true,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_glob(mut self, glob: impl Into<String>) -> Self {
        self.glob = Some(glob.into());
        self
    }

    pub fn with_snippet_length(mut self, snippet_length: usize) -> Self {
        self.snippet_length = Some(snippet_length);
        self
    }

    pub fn with_weights(mut self, lexical: Option<f32>, vector: Option<f32>) -> Self {
        self.lexical_weight = lexical;
        self.vector_weight = vector;
        self
    }

    pub fn without_content(mut self) -> Self {
        self.include_content = false;
        self
    }

    pub fn bm25() -> Self {
        Self::new().with_mode(SearchMode::Bm25)
    }

    pub fn vector() -> Self {
        Self::new().with_mode(SearchMode::Vector)
    }

    pub fn hybrid() -> Self {
        Self::new().with_mode(SearchMode::Hybrid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.bm25.k1 = 1.2;
        settings.snippet_length = 100;
        settings.auto_index = vec![IndexTarget::new("/notes")];
        settings.default_mode = Some(SearchMode::Bm25);

        let config = SearchConfig::from_settings(&settings);
        assert!((config.bm25.k1 - 1.2).abs() < 1e-6);
        assert_eq!(config.snippet_length, 100);
        assert_eq!(config.auto_index.len(), 1);
        assert_eq!(config.default_mode, Some(SearchMode::Bm25));
        assert!(config.embedding.is_none());
        assert!(config.vector.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = SearchOptions::hybrid()
            .with_top_k(3)
            .with_path("/docs")
            .with_weights(Some(0.2), None)
            .without_content();
        assert_eq!(options.mode, Some(SearchMode::Hybrid));
        assert_eq!(options.top_k, Some(3));
        assert_eq!(options.lexical_weight, Some(0.2));
        assert!(options.vector_weight.is_none());
        assert!(!options.include_content);
        assert!(SearchOptions::default().include_content);
    }
}
