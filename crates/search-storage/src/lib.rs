//! # search-storage
//!
//! Document store collaborator for workspace search.
//!
//! Documents live under virtual, `/`-rooted paths. A store lists files
//! under a base path matching a glob and returns their raw text.
//!
//! ## Features
//! - `DocumentStore` trait (`list`, `read_raw`); listings carry per-entry errors
//! - `LocalStore`: a directory on disk mapped onto `/`
//! - `MemoryStore`: in-process files, for tests and embedding callers
//! - `PathFilter`: base-path prefix plus glob relative to the base

pub mod error;
pub mod filter;
pub mod local;
pub mod memory;
pub mod store;

pub use error::StorageError;
pub use filter::{compile_glob, normalize_base_path, normalize_document_path, PathFilter};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use store::{DocumentStore, FileInfo, Listing, ListingError, RawContent};
