//! # search-embeddings
//!
//! Embedding side of the vector collaborator for workspace search.
//!
//! ## Features
//! - `EmbeddingAdapter` trait (single and batch embedding)
//! - `EmbeddingSource` resolving an adapter, a model id or a config once
//! - `ApiEmbedder` for OpenAI-compatible `/embeddings` endpoints
//! - No internal retries; failures propagate to the caller

pub mod api;
pub mod error;
pub mod model;
pub mod source;

pub use api::{ApiEmbedder, ApiEmbedderConfig, DEFAULT_BASE_URL};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingAdapter};
pub use source::EmbeddingSource;
