//! End-to-end test infrastructure for workspace search.
//!
//! Provides a shared TestHarness over a temporary directory, a deterministic
//! keyword embedder, and helpers for building engines over in-memory stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use search_bm25::tokenize;
use search_embeddings::{Embedding, EmbeddingAdapter, EmbeddingError};
use search_engine::{SearchConfig, WorkspaceSearch};
use search_storage::{LocalStore, MemoryStore};
use search_types::SearchResult;
use search_vector::InMemoryVectorStore;

/// Words the keyword embedder counts, one dimension each.
pub const VOCAB: [&str; 6] = ["rust", "python", "database", "search", "memory", "web"];

/// Bag-of-words embedder over [`VOCAB`].
///
/// Texts sharing vocabulary words get positive cosine similarity; texts with
/// none of them embed to the zero vector.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingAdapter for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let tokens = tokenize(text);
        Ok(Embedding::new(
            VOCAB
                .iter()
                .map(|word| tokens.iter().filter(|t| t == word).count() as f32)
                .collect(),
        ))
    }
}

/// Embedder that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Err(EmbeddingError::Adapter("embedding service unavailable".to_string()))
    }
}

/// Config with the keyword embedder and a fresh in-memory vector store.
pub fn vector_config() -> SearchConfig {
    SearchConfig::new()
        .with_embedding(Arc::new(KeywordEmbedder) as Arc<dyn EmbeddingAdapter>)
        .with_vector(Arc::new(InMemoryVectorStore::new()))
}

/// Engine over an in-memory store seeded with `files`.
pub fn memory_engine<'a>(
    files: impl IntoIterator<Item = (&'a str, &'a str)>,
    config: SearchConfig,
) -> WorkspaceSearch {
    let store = MemoryStore::with_files(files);
    WorkspaceSearch::new(Arc::new(store), config).expect("Failed to create engine")
}

/// A small corpus with distinct topics under a few directories.
pub fn topic_corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "/notes/rust.md",
            "Rust ownership and the borrow checker give memory safety.\nRust has no garbage collector.",
        ),
        (
            "/notes/python.md",
            "Python web frameworks like Django make web apps quick to build.",
        ),
        (
            "/notes/db.md",
            "Database search uses indexes.\nA database query planner picks a plan.",
        ),
        (
            "/src/search.rs",
            "fn search() { /* rust search over memory */ }",
        ),
        ("/src/web.py", "def web(): return 'python web handler'"),
        ("/README.txt", "Nothing to see here."),
    ]
}

/// Ids of `results`, in rank order.
pub fn result_ids(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.id.as_str()).collect()
}

/// Random text drawn from [`VOCAB`] plus filler words.
pub fn random_text(rng: &mut StdRng, words: usize) -> String {
    const FILLER: [&str; 4] = ["the", "and", "of", "notes"];
    (0..words)
        .map(|_| {
            if rng.random_bool(0.5) {
                VOCAB[rng.random_range(0..VOCAB.len())]
            } else {
                FILLER[rng.random_range(0..FILLER.len())]
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seeded generator for reproducible corpora.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Shared test harness for E2E tests over a real directory.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Workspace root on disk
    pub root: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Engine over a [`LocalStore`] rooted at the harness directory.
    pub fn engine(&self, config: SearchConfig) -> WorkspaceSearch {
        let store = LocalStore::new(&self.root).expect("Failed to open local store");
        WorkspaceSearch::new(Arc::new(store), config).expect("Failed to create engine")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
