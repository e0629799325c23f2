//! Directory-backed document store.

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::filter::{compile_glob, normalize_base_path};
use crate::store::{DocumentStore, FileInfo, Listing, ListingError, RawContent};

/// Maps a directory on disk onto the virtual root `/`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StorageError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disk location of a virtual path. Rejects `..` and other non-normal components.
    fn resolve(&self, virtual_path: &str) -> Result<PathBuf, StorageError> {
        let mut resolved = self.root.clone();
        for component in Path::new(virtual_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::OutsideRoot(virtual_path.to_string())),
            }
        }
        Ok(resolved)
    }
}

fn to_utc(time: std::io::Result<SystemTime>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from).unwrap_or_default()
}

/// `/`-joined relative path, or `None` for non-UTF-8 names.
fn relative_key(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

/// Lossy `/`-joined relative path, for reporting entries `relative_key` rejects.
fn lossy_key(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn list(&self, glob: &str, base_path: &str) -> Result<Listing, StorageError> {
        let matcher = compile_glob(glob)?;
        let virtual_base = normalize_base_path(base_path);
        let dir = self.resolve(&virtual_base)?;
        if !dir.is_dir() {
            return Err(StorageError::NotFound(virtual_base));
        }

        let listing = tokio::task::spawn_blocking(move || {
            let mut listing = Listing::default();
            for entry in WalkDir::new(&dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "Unreadable entry");
                        let path = e
                            .path()
                            .and_then(|p| relative_key(p, &dir))
                            .map(|rel| format!("{virtual_base}{rel}"))
                            .unwrap_or_else(|| virtual_base.clone());
                        let message = e
                            .io_error()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| e.to_string());
                        listing.errors.push(ListingError::new(path, message));
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(rel) = relative_key(entry.path(), &dir) else {
                    let rel = lossy_key(entry.path(), &dir);
                    if matcher.is_match(&rel) {
                        warn!(path = %rel, "Non-UTF-8 path");
                        listing.errors.push(ListingError::new(
                            format!("{virtual_base}{rel}"),
                            "path is not valid UTF-8",
                        ));
                    }
                    continue;
                };
                if !matcher.is_match(&rel) {
                    continue;
                }
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %rel, error = %e, "File without metadata");
                        listing
                            .errors
                            .push(ListingError::new(format!("{virtual_base}{rel}"), e.to_string()));
                        continue;
                    }
                };
                listing.files.push(FileInfo {
                    path: format!("{virtual_base}{rel}"),
                    size: metadata.len(),
                    modified_at: to_utc(metadata.modified()),
                });
            }
            listing
        })
        .await
        .map_err(|e| StorageError::Walk(e.to_string()))?;

        debug!(
            glob = %glob,
            base = %base_path,
            count = listing.files.len(),
            errors = listing.errors.len(),
            "Listed files"
        );
        Ok(listing)
    }

    async fn read_raw(&self, path: &str) -> Result<RawContent, StorageError> {
        let disk_path = self.resolve(path)?;
        let bytes = match tokio::fs::read(&disk_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let modified_at = to_utc(tokio::fs::metadata(&disk_path).await.and_then(|m| m.modified()));
        let content =
            String::from_utf8(bytes).map_err(|_| StorageError::Encoding(path.to_string()))?;

        Ok(RawContent {
            content,
            modified_at,
        })
    }
}
