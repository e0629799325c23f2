//! # search-types
//!
//! Shared domain types for the workspace search engine.
//!
//! This crate defines the data structures passed between the index,
//! the adapters and the orchestrator:
//! - Documents: content plus opaque metadata, keyed by a unique id
//! - Search results: composed score, snippet, line range, score breakdown
//! - Index summaries: per-call outcome of an indexing run
//! - Settings: layered configuration (defaults -> file -> env)

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Bm25Settings, EmbeddingSettings, HybridSettings, Settings, DEFAULT_MAX_FILE_BYTES,
    DEFAULT_SNIPPET_LENGTH,
};
pub use error::ConfigError;
pub use types::{
    ComponentStatus, IndexSummary, IndexTarget, LineRange, Metadata, ScoreDetails, SearchMode,
    SearchResult, SourceDocument, DEFAULT_GLOB,
};
