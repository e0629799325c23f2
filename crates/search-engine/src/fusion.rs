//! Score normalization and hybrid fusion.
//!
//! Both signals are max-normalized per query: each raw score is divided by
//! the batch maximum, so the best hit of a signal scores 1.0. Vector scores
//! are clamped at 0 first, since cosine similarity can be negative.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use search_types::SearchMode;

use crate::config::DEFAULT_HYBRID_WEIGHT;

/// Clamp into [0, 1]; NaN maps to 0.
pub fn clamp_score(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Divide every score by the batch maximum. All zeros when the maximum is <= 0.
pub fn normalize_scores(scores: &[(String, f32)]) -> HashMap<String, f32> {
    let max = scores
        .iter()
        .map(|(_, s)| *s)
        .filter(|s| s.is_finite())
        .fold(0.0_f32, f32::max);

    scores
        .iter()
        .map(|(id, score)| {
            let normalized = if max > 0.0 {
                clamp_score(score / max)
            } else {
                0.0
            };
            (id.clone(), normalized)
        })
        .collect()
}

/// Resolved fusion weights, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    pub lexical: f32,
    pub vector: f32,
}

impl HybridWeights {
    /// Fill a missing weight: one given weight implies `1 - given` for the
    /// other, none given falls back to `defaults`.
    pub fn resolve(lexical: Option<f32>, vector: Option<f32>, defaults: HybridWeights) -> Self {
        let (lexical, vector) = match (lexical, vector) {
            (None, None) => (defaults.lexical, defaults.vector),
            (Some(l), None) => (l, 1.0 - l),
            (None, Some(v)) => (1.0 - v, v),
            (Some(l), Some(v)) => (l, v),
        };
        Self {
            lexical: clamp_score(lexical),
            vector: clamp_score(vector),
        }
    }

    /// Weighted mean of the two normalized signals; 0 when both weights are 0.
    pub fn combine(&self, bm25: f32, vector: f32) -> f32 {
        let total = self.lexical + self.vector;
        if total > 0.0 {
            clamp_score((self.lexical * bm25 + self.vector * vector) / total)
        } else {
            0.0
        }
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            lexical: DEFAULT_HYBRID_WEIGHT,
            vector: DEFAULT_HYBRID_WEIGHT,
        }
    }
}

/// A candidate after fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub id: String,
    pub score: f32,
    /// Raw BM25 score, when the mode uses BM25 and the id was a BM25 hit
    pub bm25_raw: Option<f32>,
    /// Raw vector score, when the mode uses vectors and the id was a vector hit
    pub vector_raw: Option<f32>,
}

/// Descending order on raw scores; a missing score sorts last.
fn raw_desc(a: Option<f32>, b: Option<f32>) -> Ordering {
    let a = a.unwrap_or(f32::NEG_INFINITY);
    let b = b.unwrap_or(f32::NEG_INFINITY);
    b.total_cmp(&a)
}

/// Compose final scores for `mode` and sort them.
///
/// Order is final score descending, then raw vector score descending, then
/// raw BM25 score descending, then id ascending. A batch whose vector
/// similarities are all <= 0 normalizes to 0 and keeps its raw order.
///
/// Hybrid mode ranks the union of both hit lists, treating a missing
/// signal as 0.
pub fn fuse(
    mode: SearchMode,
    bm25_hits: &[(String, f32)],
    vector_hits: &[(String, f32)],
    bm25_norm: &HashMap<String, f32>,
    vector_norm: &HashMap<String, f32>,
    weights: HybridWeights,
) -> Vec<FusedHit> {
    let mut seen = HashSet::new();
    let ids: Vec<&String> = match mode {
        SearchMode::Bm25 => bm25_hits.iter().map(|(id, _)| id).collect(),
        SearchMode::Vector => vector_hits.iter().map(|(id, _)| id).collect(),
        SearchMode::Hybrid => bm25_hits
            .iter()
            .chain(vector_hits.iter())
            .map(|(id, _)| id)
            .collect(),
    };

    let bm25_raw: HashMap<&str, f32> = if mode.uses_bm25() {
        raw_scores(bm25_hits)
    } else {
        HashMap::new()
    };
    let vector_raw: HashMap<&str, f32> = if mode.needs_vectors() {
        raw_scores(vector_hits)
    } else {
        HashMap::new()
    };

    let mut fused: Vec<FusedHit> = ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| {
            let bm25 = bm25_norm.get(id).copied().unwrap_or(0.0);
            let vector = vector_norm.get(id).copied().unwrap_or(0.0);
            let score = match mode {
                SearchMode::Bm25 => clamp_score(bm25),
                SearchMode::Vector => clamp_score(vector),
                SearchMode::Hybrid => weights.combine(bm25, vector),
            };
            FusedHit {
                id: id.clone(),
                score,
                bm25_raw: bm25_raw.get(id.as_str()).copied(),
                vector_raw: vector_raw.get(id.as_str()).copied(),
            }
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| raw_desc(a.vector_raw, b.vector_raw))
            .then_with(|| raw_desc(a.bm25_raw, b.bm25_raw))
            .then_with(|| a.id.cmp(&b.id))
    });
    fused
}

/// First raw score per id; NaN counts as missing.
fn raw_scores(hits: &[(String, f32)]) -> HashMap<&str, f32> {
    let mut raw = HashMap::with_capacity(hits.len());
    for (id, score) in hits {
        if !score.is_nan() {
            raw.entry(id.as_str()).or_insert(*score);
        }
    }
    raw
}

/// Apply the score floor, then cap at `top_k`.
pub fn apply_limits(hits: Vec<FusedHit>, min_score: f32, top_k: usize) -> Vec<FusedHit> {
    let min_score = clamp_score(min_score);
    hits.into_iter()
        .filter(|hit| hit.score >= min_score)
        .take(top_k)
        .collect()
}
