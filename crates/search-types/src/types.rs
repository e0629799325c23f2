//! Core data model shared by the index, adapters and orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Opaque per-document metadata.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Glob used when an index target does not name one.
pub const DEFAULT_GLOB: &str = "**/*";

/// Retrieval strategy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Lexical BM25 ranking only
    Bm25,
    /// Embedding similarity only
    Vector,
    /// Weighted fusion of both signals
    Hybrid,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Bm25 => "bm25",
            SearchMode::Vector => "vector",
            SearchMode::Hybrid => "hybrid",
        }
    }

    /// Whether this mode needs an embedding and a vector adapter.
    pub fn needs_vectors(&self) -> bool {
        matches!(self, SearchMode::Vector | SearchMode::Hybrid)
    }

    /// Whether this mode consults the BM25 index.
    pub fn uses_bm25(&self) -> bool {
        matches!(self, SearchMode::Bm25 | SearchMode::Hybrid)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bm25" => Ok(SearchMode::Bm25),
            "vector" => Ok(SearchMode::Vector),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Lifecycle of a search component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    #[default]
    Idle,
    Ready,
    /// Terminal; every later call is rejected
    Destroyed,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Idle => "idle",
            ComponentStatus::Ready => "ready",
            ComponentStatus::Destroyed => "destroyed",
        }
    }
}

/// A base path plus an optional glob selecting files to index.
///
/// Deserializes from either a bare path string or a `{ path, glob }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexTargetRepr")]
pub struct IndexTarget {
    /// Base path; empty means the store root
    pub path: String,
    /// Glob relative to `path` (default `**/*`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexTargetRepr {
    Path(String),
    Target {
        path: String,
        #[serde(default)]
        glob: Option<String>,
    },
}

impl From<IndexTargetRepr> for IndexTarget {
    fn from(repr: IndexTargetRepr) -> Self {
        match repr {
            IndexTargetRepr::Path(path) => IndexTarget::new(path),
            IndexTargetRepr::Target { path, glob } => IndexTarget { path, glob },
        }
    }
}

impl IndexTarget {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            glob: None,
        }
    }

    pub fn with_glob(mut self, glob: impl Into<String>) -> Self {
        self.glob = Some(glob.into());
        self
    }

    /// Base path with the root substituted for an empty value.
    pub fn base_path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    /// Glob with the `**/*` default applied.
    pub fn glob_or_default(&self) -> &str {
        self.glob.as_deref().unwrap_or(DEFAULT_GLOB)
    }
}

impl From<&str> for IndexTarget {
    fn from(path: &str) -> Self {
        IndexTarget::new(path)
    }
}

impl From<String> for IndexTarget {
    fn from(path: String) -> Self {
        IndexTarget::new(path)
    }
}

/// A document handed to the indexing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Unique id; re-adding an id replaces the previous document
    pub id: String,
    pub path: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SourceDocument {
    /// Document whose id is its path.
    pub fn at_path(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            path,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// 1-indexed inclusive span of lines containing query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Per-signal normalized scores behind a composed score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bm25: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<f32>,
}

impl ScoreDetails {
    pub fn is_empty(&self) -> bool {
        self.bm25.is_none() && self.vector.is_none()
    }
}

/// A ranked match returned from a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub path: String,
    /// Composed score in [0, 1]
    pub score: f32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_details: Option<ScoreDetails>,
    /// Raw BM25 score (diagnostics only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bm25_score: Option<f32>,
    /// Raw adapter score (diagnostics only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Outcome of an indexing call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Documents added to the lexical index
    pub indexed: usize,
    /// Documents stored in the vector backend; `None` when no backend is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_indexed: Option<usize>,
    /// Files skipped for exceeding the size limit
    pub skipped: usize,
    /// Per-target and per-file failures, in encounter order
    pub errors: Vec<String>,
}

impl IndexSummary {
    /// Empty summary; `vector_indexed` starts at zero when vectors are enabled.
    pub fn new(vector_enabled: bool) -> Self {
        Self {
            indexed: 0,
            vector_indexed: vector_enabled.then_some(0),
            skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: IndexSummary) {
        self.indexed += other.indexed;
        if let Some(count) = other.vector_indexed {
            self.vector_indexed = Some(self.vector_indexed.unwrap_or(0) + count);
        }
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
