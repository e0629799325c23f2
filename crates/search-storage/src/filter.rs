//! Path normalization and base-path + glob filtering.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::StorageError;

/// Compile a glob where `*` never crosses `/` and dotfiles match.
pub fn compile_glob(glob: &str) -> Result<GlobMatcher, StorageError> {
    Ok(GlobBuilder::new(glob)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Directory prefix form of a base path: leading and trailing `/`.
///
/// `""`, `"/"` and whitespace all map to `"/"`.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Path under which an in-memory document is stored: trimmed, rooted at `/`.
pub fn normalize_document_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Accepts document paths under a base directory that match an optional glob.
///
/// The glob is tested against the path relative to the base, with any
/// leading `/` removed.
#[derive(Debug, Clone)]
pub struct PathFilter {
    base: Option<String>,
    glob: Option<GlobMatcher>,
}

impl PathFilter {
    /// Filter that accepts everything.
    pub fn any() -> Self {
        Self {
            base: None,
            glob: None,
        }
    }

    /// Build from optional search options. An empty base path means no prefix check.
    pub fn new(base_path: Option<&str>, glob: Option<&str>) -> Result<Self, StorageError> {
        let base = base_path
            .filter(|p| !p.trim().is_empty())
            .map(normalize_base_path);
        let glob = glob
            .filter(|g| !g.trim().is_empty())
            .map(compile_glob)
            .transpose()?;
        Ok(Self { base, glob })
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn matches(&self, path: &str) -> bool {
        let rest = match &self.base {
            Some(base) => match path.strip_prefix(base.as_str()) {
                Some(rest) => rest,
                None => return false,
            },
            None => path,
        };

        match &self.glob {
            Some(glob) => glob.is_match(rest.trim_start_matches('/')),
            None => true,
        }
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::any()
    }
}
