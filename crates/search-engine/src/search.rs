//! Indexing and query orchestration.
//!
//! Lifecycle: `Idle -> Ready` on `init`, `-> Destroyed` on `destroy`.
//! Destroyed instances reject every call.
//!
//! Index state sits behind a `std::sync::RwLock` that is only taken inside
//! synchronous helpers, so no guard ever lives across an `.await` and each
//! batch of documents lands atomically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use search_bm25::{Bm25Index, CorpusStats};
use search_embeddings::{EmbeddingAdapter, EmbeddingError};
use search_storage::{normalize_document_path, DocumentStore, PathFilter};
use search_types::{
    ComponentStatus, IndexSummary, IndexTarget, Metadata, ScoreDetails, SearchMode, SearchResult,
    SourceDocument,
};
use search_vector::{VectorAdapter, VectorHit, VectorItem};

use crate::config::{SearchConfig, SearchOptions, CANDIDATE_MULTIPLIER, DEFAULT_TOP_K};
use crate::error::SearchError;
use crate::fusion::{apply_limits, clamp_score, fuse, normalize_scores, FusedHit, HybridWeights};
use crate::single_flight::SingleFlight;
use crate::snippet::{build_line_range, build_snippet};

#[derive(Debug, Default)]
struct IndexState {
    bm25: Bm25Index,
    documents: HashMap<String, SourceDocument>,
}

/// Instance snapshot for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchInfo {
    pub status: ComponentStatus,
    pub default_mode: SearchMode,
    pub auto_index: Vec<IndexTarget>,
    pub max_file_bytes: u64,
    pub snippet_length: usize,
    pub has_embedding: bool,
    pub has_vector: bool,
    pub document_count: usize,
}

/// Per-query candidate scores carried into result building.
#[derive(Default)]
struct Candidates {
    bm25_raw: HashMap<String, f32>,
    vector_raw: HashMap<String, f32>,
    bm25_norm: HashMap<String, f32>,
    vector_norm: HashMap<String, f32>,
    /// Paths resolved for vector hits
    vector_paths: HashMap<String, String>,
}

/// Hybrid search engine over one document store.
pub struct WorkspaceSearch {
    store: Arc<dyn DocumentStore>,
    state: RwLock<IndexState>,
    embedding: Option<Arc<dyn EmbeddingAdapter>>,
    vector: Option<Arc<dyn VectorAdapter>>,
    auto_index: Vec<IndexTarget>,
    max_file_bytes: u64,
    snippet_length: usize,
    default_mode: SearchMode,
    default_weights: HybridWeights,
    status: RwLock<ComponentStatus>,
    auto_indexed: SingleFlight<()>,
}

impl WorkspaceSearch {
    /// Build an engine. The embedding source is resolved here; no indexing starts.
    pub fn new(store: Arc<dyn DocumentStore>, config: SearchConfig) -> Result<Self, SearchError> {
        if config.snippet_length == 0 {
            return Err(SearchError::Configuration(
                "snippet_length must be > 0".to_string(),
            ));
        }

        let embedding = config
            .embedding
            .map(|source| source.resolve())
            .transpose()
            .map_err(|e| SearchError::Configuration(e.to_string()))?;
        let vectors_ready = embedding.is_some() && config.vector.is_some();

        let default_mode = match config.default_mode {
            Some(mode) if mode.needs_vectors() && !vectors_ready => {
                return Err(SearchError::vector_not_configured())
            }
            Some(mode) => mode,
            None if vectors_ready => SearchMode::Hybrid,
            None => SearchMode::Bm25,
        };

        let default_weights = HybridWeights::resolve(
            config.hybrid.lexical_weight,
            config.hybrid.vector_weight,
            HybridWeights::default(),
        );

        debug!(
            default_mode = %default_mode,
            has_embedding = embedding.is_some(),
            has_vector = config.vector.is_some(),
            auto_index = config.auto_index.len(),
            "Created workspace search"
        );

        Ok(Self {
            store,
            state: RwLock::new(IndexState {
                bm25: Bm25Index::new(config.bm25),
                documents: HashMap::new(),
            }),
            embedding,
            vector: config.vector,
            auto_index: config.auto_index,
            max_file_bytes: config.max_file_bytes,
            snippet_length: config.snippet_length,
            default_mode,
            default_weights,
            status: RwLock::new(ComponentStatus::Idle),
            auto_indexed: SingleFlight::new(),
        })
    }

    // ===== Lifecycle =====

    /// Mark ready and run auto-indexing (once per instance).
    pub async fn init(&self) -> Result<(), SearchError> {
        self.mark_ready()?;
        self.ensure_auto_index().await;
        Ok(())
    }

    /// Enter the terminal state. Idempotent.
    pub fn destroy(&self) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = ComponentStatus::Destroyed;
        debug!("Workspace search destroyed");
    }

    pub fn status(&self) -> ComponentStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_ready(&self) -> Result<(), SearchError> {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if *status == ComponentStatus::Destroyed {
            return Err(SearchError::Destroyed);
        }
        *status = ComponentStatus::Ready;
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), SearchError> {
        if self.status() == ComponentStatus::Destroyed {
            Err(SearchError::Destroyed)
        } else {
            Ok(())
        }
    }

    async fn ensure_auto_index(&self) {
        if self.auto_index.is_empty() {
            return;
        }
        self.auto_indexed
            .run(move || async move {
                let summary = self.index_targets(&self.auto_index, self.max_file_bytes).await;
                for error in &summary.errors {
                    warn!(error = %error, "Auto-index error");
                }
                info!(
                    indexed = summary.indexed,
                    skipped = summary.skipped,
                    errors = summary.errors.len(),
                    "Auto-index complete"
                );
            })
            .await;
    }

    // ===== Introspection =====

    pub fn info(&self) -> SearchInfo {
        SearchInfo {
            status: self.status(),
            default_mode: self.default_mode,
            auto_index: self.auto_index.clone(),
            max_file_bytes: self.max_file_bytes,
            snippet_length: self.snippet_length,
            has_embedding: self.embedding.is_some(),
            has_vector: self.vector.is_some(),
            document_count: self.document_count(),
        }
    }

    pub fn corpus_stats(&self) -> CorpusStats {
        self.read_state().bm25.stats()
    }

    pub fn document_count(&self) -> usize {
        self.read_state().documents.len()
    }

    pub fn document(&self, id: &str) -> Option<SourceDocument> {
        self.read_state().documents.get(id).cloned()
    }

    pub fn default_mode(&self) -> SearchMode {
        self.default_mode
    }

    // ===== Indexing =====

    /// Index files from the store. An empty slice means the auto-index targets.
    pub async fn index_paths(&self, targets: &[IndexTarget]) -> Result<IndexSummary, SearchError> {
        self.index_paths_with_limit(targets, self.max_file_bytes)
            .await
    }

    /// [`index_paths`](Self::index_paths) with a per-call file size limit (0 disables it).
    pub async fn index_paths_with_limit(
        &self,
        targets: &[IndexTarget],
        max_file_bytes: u64,
    ) -> Result<IndexSummary, SearchError> {
        self.ensure_live()?;
        let targets = if targets.is_empty() {
            &self.auto_index[..]
        } else {
            targets
        };
        Ok(self.index_targets(targets, max_file_bytes).await)
    }

    /// Index already-loaded documents.
    pub async fn index_documents(
        &self,
        docs: Vec<SourceDocument>,
    ) -> Result<IndexSummary, SearchError> {
        self.ensure_live()?;
        Ok(self.index_batch(docs).await)
    }

    /// Index a single in-memory document under a normalized path.
    pub async fn index_content(
        &self,
        path: &str,
        content: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<IndexSummary, SearchError> {
        self.ensure_live()?;
        let path = normalize_document_path(path);
        let mut doc = SourceDocument::at_path(path, content);
        doc.metadata = metadata;
        Ok(self.index_batch(vec![doc]).await)
    }

    /// Remove one document from every index. Returns whether it was indexed.
    pub async fn remove_document(&self, id: &str) -> Result<bool, SearchError> {
        self.ensure_live()?;
        let removed = self.remove_local(id);
        if let Some(vector) = &self.vector {
            vector.delete_batch(&[id.to_string()]).await?;
        }
        debug!(id = %id, removed, "Removed document");
        Ok(removed)
    }

    /// Remove every document. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, SearchError> {
        self.ensure_live()?;
        let ids = self.clear_local();
        if let Some(vector) = &self.vector {
            if !ids.is_empty() {
                vector.delete_batch(&ids).await?;
            }
        }
        info!(removed = ids.len(), "Cleared workspace index");
        Ok(ids.len())
    }

    /// Clear, then index `targets`.
    pub async fn reindex(&self, targets: &[IndexTarget]) -> Result<IndexSummary, SearchError> {
        self.clear().await?;
        self.index_paths(targets).await
    }

    async fn index_targets(&self, targets: &[IndexTarget], max_file_bytes: u64) -> IndexSummary {
        let mut summary = IndexSummary::new(self.vectors().is_some());

        for target in targets {
            let base = target.base_path();
            let glob = target.glob_or_default();

            let listing = match self.store.list(glob, base).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(base = %base, glob = %glob, error = %e, "Failed to list index target");
                    summary.errors.push(format!("Failed to glob {base}: {e}"));
                    continue;
                }
            };
            for error in &listing.errors {
                warn!(path = %error.path, error = %error.message, "Failed to list file");
                summary
                    .errors
                    .push(format!("Failed to read {}: {}", error.path, error.message));
            }

            let mut docs = Vec::with_capacity(listing.files.len());
            for file in listing.files {
                if exceeds_limit(file.size, max_file_bytes) {
                    debug!(path = %file.path, size = file.size, "Skipping oversized file");
                    summary.skipped += 1;
                    continue;
                }

                let raw = match self.store.read_raw(&file.path).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!(path = %file.path, error = %e, "Failed to read file");
                        summary.errors.push(format!("Failed to read {}: {e}", file.path));
                        continue;
                    }
                };

                if exceeds_limit(raw.content.len() as u64, max_file_bytes) {
                    debug!(path = %file.path, "Skipping oversized content");
                    summary.skipped += 1;
                    continue;
                }

                let mut metadata = Metadata::new();
                metadata.insert("size".to_string(), Value::from(file.size));
                metadata.insert(
                    "modified_at".to_string(),
                    Value::from(file.modified_at.to_rfc3339()),
                );
                docs.push(SourceDocument::at_path(file.path, raw.content).with_metadata(metadata));
            }

            summary.merge(self.index_batch(docs).await);
        }

        info!(
            targets = targets.len(),
            indexed = summary.indexed,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Indexed paths"
        );
        summary
    }

    /// Lexical indexing always completes; vector indexing failures are recorded.
    async fn index_batch(&self, docs: Vec<SourceDocument>) -> IndexSummary {
        let mut summary = IndexSummary::new(self.vectors().is_some());
        if docs.is_empty() {
            return summary;
        }

        self.apply_documents(&docs);
        summary.indexed = docs.len();

        if let Some((embedding, vector)) = self.vectors() {
            match store_vectors(embedding.as_ref(), vector.as_ref(), &docs).await {
                Ok(()) => summary.vector_indexed = Some(docs.len()),
                Err(e) => {
                    warn!(count = docs.len(), error = %e, "Vector indexing failed");
                    summary.errors.push(format!("Vector indexing failed: {e}"));
                }
            }
        }

        summary
    }

    // ===== Search =====

    /// Rank indexed documents against `query`.
    ///
    /// Fails with a configuration error, before any work, when a vector mode
    /// is requested without both adapters. Adapter failures propagate.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.ensure_live()?;
        let mode = self.resolve_mode(options.mode)?;
        let filter = PathFilter::new(options.path.as_deref(), options.glob.as_deref())
            .map_err(|e| SearchError::InvalidFilter(e.to_string()))?;

        self.ensure_auto_index().await;

        let top_k = options.top_k.unwrap_or(DEFAULT_TOP_K);
        let limit = top_k.saturating_mul(CANDIDATE_MULTIPLIER);
        let weights = HybridWeights::resolve(
            options.lexical_weight,
            options.vector_weight,
            self.default_weights,
        );
        let min_score = clamp_score(options.min_score.unwrap_or(0.0));

        let bm25_hits = if mode.uses_bm25() {
            self.lexical_candidates(query, limit, &filter)
        } else {
            Vec::new()
        };
        let (vector_hits, vector_paths) = if mode.needs_vectors() {
            self.vector_candidates(query, limit, &filter).await?
        } else {
            (Vec::new(), HashMap::new())
        };

        let vector_floor: Vec<(String, f32)> = vector_hits
            .iter()
            .map(|(id, score)| (id.clone(), score.max(0.0)))
            .collect();
        let bm25_norm = normalize_scores(&bm25_hits);
        let vector_norm = normalize_scores(&vector_floor);

        let fused = fuse(
            mode,
            &bm25_hits,
            &vector_hits,
            &bm25_norm,
            &vector_norm,
            weights,
        );
        let hits = apply_limits(fused, min_score, top_k);

        let candidates = Candidates {
            bm25_raw: bm25_hits.into_iter().collect(),
            vector_raw: vector_hits.into_iter().collect(),
            bm25_norm,
            vector_norm,
            vector_paths,
        };
        let snippet_length = options.snippet_length.unwrap_or(self.snippet_length);
        let results = self.build_results(
            hits,
            &candidates,
            query,
            snippet_length,
            options.include_content,
        );

        info!(
            mode = %mode,
            top_k,
            results = results.len(),
            "Search complete"
        );
        Ok(results)
    }

    fn resolve_mode(&self, requested: Option<SearchMode>) -> Result<SearchMode, SearchError> {
        match requested {
            None => Ok(self.default_mode),
            Some(mode) if mode.needs_vectors() && self.vectors().is_none() => {
                Err(SearchError::vector_not_configured())
            }
            Some(mode) => Ok(mode),
        }
    }

    fn lexical_candidates(&self, query: &str, limit: usize, filter: &PathFilter) -> Vec<(String, f32)> {
        self.read_state()
            .bm25
            .search_filtered(query, Some(limit), |doc| filter.matches(&doc.path))
            .into_iter()
            .map(|hit| (hit.id, hit.score))
            .collect()
    }

    async fn vector_candidates(
        &self,
        query: &str,
        limit: usize,
        filter: &PathFilter,
    ) -> Result<(Vec<(String, f32)>, HashMap<String, String>), SearchError> {
        let (embedding, vector) = self
            .vectors()
            .ok_or_else(SearchError::vector_not_configured)?;

        let query_embedding = embedding.embed(query).await?;
        let hits = vector.search(&query_embedding, limit).await?;
        debug!(hits = hits.len(), limit, "Vector candidates");
        Ok(self.filter_vector_hits(hits, filter))
    }

    /// Resolve each hit's path (metadata, then document map, then id) and filter.
    fn filter_vector_hits(
        &self,
        hits: Vec<VectorHit>,
        filter: &PathFilter,
    ) -> (Vec<(String, f32)>, HashMap<String, String>) {
        let state = self.read_state();
        let mut seen = HashSet::new();
        let mut scored = Vec::with_capacity(hits.len());
        let mut paths = HashMap::new();

        for hit in hits {
            if !seen.insert(hit.id.clone()) {
                continue;
            }
            let path = hit
                .metadata_path()
                .map(str::to_string)
                .or_else(|| state.documents.get(&hit.id).map(|d| d.path.clone()))
                .unwrap_or_else(|| hit.id.clone());
            if !filter.matches(&path) {
                continue;
            }
            paths.insert(hit.id.clone(), path);
            scored.push((hit.id, hit.score));
        }

        (scored, paths)
    }

    fn build_results(
        &self,
        hits: Vec<FusedHit>,
        candidates: &Candidates,
        query: &str,
        snippet_length: usize,
        include_content: bool,
    ) -> Vec<SearchResult> {
        let state = self.read_state();

        hits.into_iter()
            .map(|hit| {
                let doc = state.documents.get(&hit.id);
                let path = doc
                    .map(|d| d.path.clone())
                    .or_else(|| candidates.vector_paths.get(&hit.id).cloned())
                    .unwrap_or_else(|| hit.id.clone());
                let content = doc.map(|d| d.content.as_str()).unwrap_or_default();

                let (snippet, line_range) = if content.is_empty() {
                    (None, None)
                } else {
                    (
                        Some(build_snippet(content, query, snippet_length)),
                        build_line_range(content, query),
                    )
                };

                let details = ScoreDetails {
                    bm25: candidates.bm25_norm.get(&hit.id).copied(),
                    vector: candidates.vector_norm.get(&hit.id).copied(),
                };

                SearchResult {
                    path,
                    score: clamp_score(hit.score),
                    content: if include_content {
                        content.to_string()
                    } else {
                        String::new()
                    },
                    snippet,
                    line_range,
                    score_details: (!details.is_empty()).then_some(details),
                    bm25_score: candidates.bm25_raw.get(&hit.id).copied(),
                    vector_score: candidates.vector_raw.get(&hit.id).copied(),
                    metadata: doc.and_then(|d| d.metadata.clone()),
                    id: hit.id,
                }
            })
            .collect()
    }

    // ===== State helpers (never called across an await) =====

    fn vectors(&self) -> Option<(&Arc<dyn EmbeddingAdapter>, &Arc<dyn VectorAdapter>)> {
        match (&self.embedding, &self.vector) {
            (Some(embedding), Some(vector)) => Some((embedding, vector)),
            _ => None,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_documents(&self, docs: &[SourceDocument]) {
        let mut state = self.write_state();
        for doc in docs {
            state.bm25.add_document(doc);
            state.documents.insert(doc.id.clone(), doc.clone());
        }
    }

    fn remove_local(&self, id: &str) -> bool {
        let mut state = self.write_state();
        let in_index = state.bm25.remove_document(id);
        let in_documents = state.documents.remove(id).is_some();
        in_index || in_documents
    }

    fn clear_local(&self) -> Vec<String> {
        let mut state = self.write_state();
        let mut ids: Vec<String> = state.documents.drain().map(|(id, _)| id).collect();
        ids.sort();
        state.bm25.clear();
        ids
    }
}

fn exceeds_limit(size: u64, max_file_bytes: u64) -> bool {
    max_file_bytes > 0 && size > max_file_bytes
}

async fn store_vectors(
    embedding: &dyn EmbeddingAdapter,
    vector: &dyn VectorAdapter,
    docs: &[SourceDocument],
) -> Result<(), SearchError> {
    let texts: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
    let embeddings = embedding.embed_batch(&texts).await?;
    if embeddings.len() != docs.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: docs.len(),
            actual: embeddings.len(),
        }
        .into());
    }

    let items = docs
        .iter()
        .zip(embeddings)
        .map(|(doc, embedding)| {
            let mut metadata = Metadata::new();
            metadata.insert("path".to_string(), Value::String(doc.path.clone()));
            VectorItem::new(doc.id.clone(), embedding).with_metadata(metadata)
        })
        .collect();

    vector.store_batch(items).await?;
    Ok(())
}
