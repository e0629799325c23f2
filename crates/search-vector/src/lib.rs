//! # search-vector
//!
//! Vector side of the similarity collaborator for workspace search.
//!
//! ## Features
//! - `VectorAdapter` trait: batch store, nearest-neighbour search, batch delete
//! - `InMemoryVectorStore`: exact cosine search over a hash map
//! - Scores are adapter-defined; the engine only clamps and normalizes them

pub mod error;
pub mod index;
pub mod memory;

pub use error::VectorError;
pub use index::{VectorAdapter, VectorHit, VectorItem};
pub use memory::InMemoryVectorStore;
