//! BM25 index with incremental corpus statistics.
//!
//! Score for a document `d` and query terms `q`:
//!
//! ```text
//! idf(t)   = ln(1 + (N - df(t) + 0.5) / (df(t) + 0.5))
//! score(d) = sum_t idf(t) * tf(t,d) * (k1 + 1) / (tf(t,d) + k1 * (1 - b + b * |d| / avgdl))
//! ```
//!
//! Every mutation computes its new state before touching the shared maps,
//! so a document is either fully present or fully absent.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use search_types::{Metadata, SourceDocument};

use crate::tokenizer::{term_frequencies, tokenize};

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation
    pub k1: f32,
    /// Length normalization strength
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn new(k1: f32, b: f32) -> Self {
        Self { k1, b }
    }
}

/// A document as held by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Bm25Document {
    pub id: String,
    pub path: String,
    /// Token count
    pub length: usize,
    pub term_freq: HashMap<String, u32>,
    pub metadata: Option<Metadata>,
}

/// A scored match.
#[derive(Debug, Clone, PartialEq)]
pub struct Bm25Hit {
    pub id: String,
    /// Raw BM25 score, always > 0
    pub score: f32,
}

/// Snapshot of corpus-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpusStats {
    pub total_docs: usize,
    pub total_length: usize,
    /// Number of distinct live terms
    pub vocabulary: usize,
}

/// In-memory BM25 index owned by a single search instance.
#[derive(Debug, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    docs: HashMap<String, Bm25Document>,
    doc_freq: HashMap<String, usize>,
    total_docs: usize,
    total_length: usize,
}

impl Bm25Index {
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn get_document(&self, id: &str) -> Option<&Bm25Document> {
        self.docs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.total_docs
    }

    pub fn is_empty(&self) -> bool {
        self.total_docs == 0
    }

    /// Number of live documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            total_docs: self.total_docs,
            total_length: self.total_length,
            vocabulary: self.doc_freq.len(),
        }
    }

    /// Add a document, replacing any existing document with the same id.
    pub fn add_document(&mut self, doc: &SourceDocument) {
        let tokens = tokenize(&doc.content);
        let term_freq = term_frequencies(&tokens);
        let entry = Bm25Document {
            id: doc.id.clone(),
            path: doc.path.clone(),
            length: tokens.len(),
            term_freq,
            metadata: doc.metadata.clone(),
        };

        self.remove_document(&doc.id);

        for term in entry.term_freq.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_docs += 1;
        self.total_length += entry.length;

        debug!(id = %entry.id, length = entry.length, "Added BM25 document");
        self.docs.insert(entry.id.clone(), entry);
    }

    /// Remove a document. Returns false if the id is unknown.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let Some(doc) = self.docs.remove(id) else {
            return false;
        };

        for term in doc.term_freq.keys() {
            if let Some(count) = self.doc_freq.get_mut(term) {
                if *count <= 1 {
                    self.doc_freq.remove(term);
                } else {
                    *count -= 1;
                }
            }
        }
        self.total_docs = self.total_docs.saturating_sub(1);
        self.total_length = self.total_length.saturating_sub(doc.length);

        debug!(id = %id, "Removed BM25 document");
        true
    }

    /// Drop every document and reset the counters.
    pub fn clear(&mut self) {
        self.docs.clear();
        self.doc_freq.clear();
        self.total_docs = 0;
        self.total_length = 0;
    }

    /// Rank all documents against `query`.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<Bm25Hit> {
        self.search_filtered(query, limit, |_| true)
    }

    /// Rank documents accepted by `filter` against `query`.
    ///
    /// Results are sorted by descending score (ties by id) and documents
    /// scoring 0 are omitted.
    pub fn search_filtered<F>(&self, query: &str, limit: Option<usize>, filter: F) -> Vec<Bm25Hit>
    where
        F: Fn(&Bm25Document) -> bool,
    {
        let mut seen = HashSet::new();
        let terms: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        if terms.is_empty() || self.total_docs == 0 {
            return Vec::new();
        }

        let n = self.total_docs as f32;
        let raw_avg = self.total_length as f32 / n;
        let avg_doc_length = if raw_avg > 0.0 { raw_avg } else { 1.0 };
        let Bm25Params { k1, b } = self.params;

        let idf: Vec<(&str, f32)> = terms
            .iter()
            .filter_map(|term| {
                let df = self.doc_freq(term);
                (df > 0).then(|| {
                    let df = df as f32;
                    (term.as_str(), (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
                })
            })
            .collect();

        if idf.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<Bm25Hit> = self
            .docs
            .values()
            .filter(|doc| filter(doc))
            .filter_map(|doc| {
                let length_norm = 1.0 - b + b * doc.length as f32 / avg_doc_length;
                let score: f32 = idf
                    .iter()
                    .filter_map(|(term, idf)| {
                        let tf = *doc.term_freq.get(*term)? as f32;
                        Some(idf * (tf * (k1 + 1.0)) / (tf + k1 * length_norm))
                    })
                    .sum();
                (score > 0.0).then(|| Bm25Hit {
                    id: doc.id.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn doc(id: &str, content: &str) -> SourceDocument {
        SourceDocument::at_path(id, content)
    }

    fn doc_freq_snapshot(index: &Bm25Index) -> HashMap<String, usize> {
        index.doc_freq.clone()
    }

    #[test]
    fn test_add_updates_stats() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha beta beta"));
        index.add_document(&doc("/b.txt", "beta gamma"));

        let stats = index.stats();
        assert_eq!(stats.total_docs, 2);
        assert_eq!(stats.total_length, 5);
        assert_eq!(stats.vocabulary, 3);
        assert_eq!(index.doc_freq("beta"), 2);
        assert_eq!(index.doc_freq("alpha"), 1);
        assert_eq!(index.get_document("/a.txt").unwrap().term_freq["beta"], 2);
    }

    #[test]
    fn test_remove_deletes_zero_doc_freq_entries() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha beta"));
        index.add_document(&doc("/b.txt", "beta"));

        assert!(index.remove_document("/a.txt"));
        assert_eq!(index.doc_freq("alpha"), 0);
        assert!(!index.doc_freq.contains_key("alpha"));
        assert_eq!(index.doc_freq("beta"), 1);
        assert_eq!(index.stats().total_length, 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha"));
        assert!(!index.remove_document("/missing.txt"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_replace_idempotence() {
        let mut once = Bm25Index::default();
        once.add_document(&doc("/a.txt", "alpha beta beta"));

        let mut twice = Bm25Index::default();
        twice.add_document(&doc("/a.txt", "alpha beta beta"));
        twice.add_document(&doc("/a.txt", "alpha beta beta"));

        assert_eq!(once.stats(), twice.stats());
        assert_eq!(doc_freq_snapshot(&once), doc_freq_snapshot(&twice));
    }

    #[test]
    fn test_replace_swaps_contribution() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha alpha"));
        index.add_document(&doc("/a.txt", "gamma"));

        assert_eq!(index.len(), 1);
        assert_eq!(index.doc_freq("alpha"), 0);
        assert_eq!(index.doc_freq("gamma"), 1);
        assert_eq!(index.stats().total_length, 1);
    }

    #[test]
    fn test_add_remove_symmetry_randomized() {
        let vocab = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];
        let mut rng = StdRng::seed_from_u64(42);
        let random_text = |rng: &mut StdRng| {
            let len = rng.random_range(0..12);
            (0..len)
                .map(|_| vocab[rng.random_range(0..vocab.len())])
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut index = Bm25Index::default();
        for i in 0..20 {
            let text = random_text(&mut rng);
            index.add_document(&doc(&format!("/base{i}.txt"), &text));
        }

        for i in 0..20 {
            let before_stats = index.stats();
            let before_df = doc_freq_snapshot(&index);

            let text = random_text(&mut rng);
            let id = format!("/transient{i}.txt");
            index.add_document(&doc(&id, &text));
            assert!(index.remove_document(&id));

            assert_eq!(index.stats(), before_stats);
            assert_eq!(doc_freq_snapshot(&index), before_df);
        }
    }

    #[test]
    fn test_search_ranks_higher_tf_first() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha beta beta beta"));
        index.add_document(&doc("/b.txt", "beta only"));

        let hits = index.search("beta", None);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "/a.txt");
        assert_eq!(hits[1].id, "/b.txt");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_monotonic_in_term_frequency() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/one.txt", "beta c d e"));
        index.add_document(&doc("/two.txt", "beta beta d e"));
        index.add_document(&doc("/three.txt", "beta beta beta e"));
        index.add_document(&doc("/other.txt", "x y z w"));

        let hits = index.search("beta", None);
        let score = |id: &str| hits.iter().find(|h| h.id == id).unwrap().score;
        assert!(score("/two.txt") >= score("/one.txt"));
        assert!(score("/three.txt") >= score("/two.txt"));
    }

    #[test]
    fn test_search_excludes_zero_scores() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha"));
        index.add_document(&doc("/b.txt", "gamma"));

        let hits = index.search("alpha missing", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "/a.txt");
    }

    #[test]
    fn test_search_empty_inputs() {
        let mut index = Bm25Index::default();
        assert!(index.search("alpha", None).is_empty());

        index.add_document(&doc("/a.txt", "alpha"));
        assert!(index.search("", None).is_empty());
        assert!(index.search("!!! ---", None).is_empty());
    }

    #[test]
    fn test_duplicate_query_terms_count_once() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha beta"));
        index.add_document(&doc("/b.txt", "gamma"));

        let single = index.search("alpha", None);
        let repeated = index.search("alpha ALPHA alpha", None);
        assert_eq!(single, repeated);
    }

    #[test]
    fn test_search_limit_and_filter() {
        let mut index = Bm25Index::default();
        for i in 0..5 {
            index.add_document(&doc(&format!("/docs/{i}.txt"), "beta"));
        }
        index.add_document(&doc("/src/main.rs", "beta"));

        assert_eq!(index.search("beta", Some(3)).len(), 3);

        let hits = index.search_filtered("beta", None, |d| d.path.starts_with("/src/"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "/src/main.rs");
    }

    #[test]
    fn test_ties_ordered_by_id() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/b.txt", "beta"));
        index.add_document(&doc("/a.txt", "beta"));

        let hits = index.search("beta", None);
        assert_eq!(hits[0].id, "/a.txt");
        assert_eq!(hits[1].id, "/b.txt");
    }

    #[test]
    fn test_empty_documents_guard_average_length() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/empty.txt", ""));
        assert_eq!(index.stats().total_length, 0);
        assert!(index.search("alpha", None).is_empty());

        index.add_document(&doc("/a.txt", "alpha"));
        let hits = index.search("alpha", None);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score.is_finite());
    }

    #[test]
    fn test_custom_params() {
        let mut flat = Bm25Index::new(Bm25Params::new(1.2, 0.0));
        flat.add_document(&doc("/short.txt", "beta"));
        flat.add_document(&doc("/long.txt", "beta x y z w v"));

        // b = 0 disables length normalization
        let hits = flat.search("beta", None);
        assert!((hits[0].score - hits[1].score).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let mut index = Bm25Index::default();
        index.add_document(&doc("/a.txt", "alpha"));
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.stats(), CorpusStats::default());
    }
}
