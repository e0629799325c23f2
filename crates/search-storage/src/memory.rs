//! In-process document store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::filter::{compile_glob, normalize_base_path, normalize_document_path};
use crate::store::{DocumentStore, FileInfo, Listing, RawContent};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    modified_at: DateTime<Utc>,
}

/// Files held in a sorted map keyed by virtual path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, MemoryFile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(path, content)` pairs.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let store = Self::new();
        for (path, content) in files {
            store.insert(path.as_ref(), content);
        }
        store
    }

    /// Add or replace a file.
    pub fn insert(&self, path: &str, content: impl Into<String>) {
        let file = MemoryFile {
            content: content.into(),
            modified_at: Utc::now(),
        };
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(normalize_document_path(path), file);
    }

    pub fn remove(&self, path: &str) -> bool {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&normalize_document_path(path))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, glob: &str, base_path: &str) -> Result<Listing, StorageError> {
        let matcher = compile_glob(glob)?;
        let base = normalize_base_path(base_path);
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());

        let listed: Vec<FileInfo> = files
            .iter()
            .filter_map(|(path, file)| {
                let rel = path.strip_prefix(base.as_str())?;
                matcher.is_match(rel).then(|| FileInfo {
                    path: path.clone(),
                    size: file.content.len() as u64,
                    modified_at: file.modified_at,
                })
            })
            .collect();
        Ok(Listing::from(listed))
    }

    async fn read_raw(&self, path: &str) -> Result<RawContent, StorageError> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(&normalize_document_path(path))
            .map(|file| RawContent {
                content: file.content.clone(),
                modified_at: file.modified_at,
            })
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}
