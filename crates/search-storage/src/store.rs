//! Document store trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A listed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Virtual path, always starting with `/`
    pub path: String,
    /// Size in bytes
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// An entry the store saw but could not list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingError {
    /// Virtual path of the entry, or the listed base when unknown
    pub path: String,
    pub message: String,
}

impl ListingError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of a listing: the files found plus per-entry failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<FileInfo>,
    pub errors: Vec<ListingError>,
}

impl From<Vec<FileInfo>> for Listing {
    fn from(files: Vec<FileInfo>) -> Self {
        Self {
            files,
            errors: Vec::new(),
        }
    }
}

/// Raw text of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub content: String,
    pub modified_at: DateTime<Utc>,
}

/// Supplier of documents for indexing.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Files under `base_path` whose base-relative path matches `glob`.
    ///
    /// A bad base or glob fails the whole call. Entries that cannot be
    /// read while walking are reported in [`Listing::errors`].
    async fn list(&self, glob: &str, base_path: &str) -> Result<Listing, StorageError>;

    /// Read a file's text.
    async fn read_raw(&self, path: &str) -> Result<RawContent, StorageError>;
}
