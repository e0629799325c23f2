//! # search-bm25
//!
//! In-memory lexical index with BM25 ranking.
//!
//! ## Features
//! - Deterministic tokenizer shared by documents and queries
//! - Incremental corpus statistics (document frequency, total length)
//! - Replace-on-re-add semantics keyed by document id
//! - Optional per-document filter applied while scoring

pub mod index;
pub mod tokenizer;

pub use index::{Bm25Document, Bm25Hit, Bm25Index, Bm25Params, CorpusStats};
pub use tokenizer::{term_frequencies, tokenize};
