//! # search-engine
//!
//! Hybrid lexical + vector search over workspace documents.
//!
//! `WorkspaceSearch` owns an in-memory BM25 index and document map, pulls
//! files from a `DocumentStore`, and optionally embeds them into a vector
//! backend. Queries are ranked by BM25, by vector similarity, or by a
//! weighted fusion of both, and come back with snippets and matched lines.
//!
//! ## Features
//! - Lazy auto-indexing shared by concurrent callers
//! - Partial-failure indexing: bad files and vector errors are reported, not fatal
//! - Per-query max-normalization with configurable hybrid weights
//! - Base-path and glob filtering, `min_score` and `top_k` limits
//! - Plain-text reports for agent tool output

pub mod config;
pub mod error;
pub mod fusion;
pub mod report;
pub mod search;
pub mod single_flight;
pub mod snippet;

pub use config::{SearchConfig, SearchOptions, CANDIDATE_MULTIPLIER, DEFAULT_TOP_K};
pub use error::{SearchError, VECTOR_NOT_CONFIGURED};
pub use fusion::HybridWeights;
pub use report::{format_index_summary, format_search_results, truncate_if_too_long};
pub use search::{SearchInfo, WorkspaceSearch};
pub use single_flight::SingleFlight;
pub use snippet::{build_line_range, build_snippet};
