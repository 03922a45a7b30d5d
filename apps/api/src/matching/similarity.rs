//! Similarity Engine: 0–100 similarity between two text spans.
//!
//! Primary path: cosine of embeddings from the configured `Embedder`.
//! Fallback (no embedder, or the embedder fails): TF-IDF cosine over the pair.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::matching::embedding::{cosine_similarity, Embedder};
use crate::matching::error::CapabilityError;
use crate::matching::text::round2;
use crate::matching::tfidf::{sparse_cosine, TfidfVectorizer};

/// Sentence-level comparison looks at no more than this many sentences per side.
const MAX_SENTENCES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSimilarity {
    pub overall_similarity: f64,
    pub tfidf_similarity: f64,
    pub avg_sentence_similarity: f64,
    pub max_sentence_similarity: f64,
    /// min(overall, tfidf) / max(overall, tfidf, 1) × 100, how far the two methods agree.
    pub similarity_confidence: f64,
}

pub fn compute_similarity(a: &str, b: &str, embedder: Option<&dyn Embedder>) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let Some(embedder) = embedder else {
        return compute_tfidf_similarity(a, b);
    };

    match embedding_similarity(a, b, embedder) {
        Ok(score) => score,
        Err(e) => {
            warn!("Embedding similarity failed, falling back to TF-IDF: {e}");
            compute_tfidf_similarity(a, b)
        }
    }
}

fn embedding_similarity(a: &str, b: &str, embedder: &dyn Embedder) -> Result<f64, CapabilityError> {
    let va = embedder.embed(a)?;
    let vb = embedder.embed(b)?;
    let cosine = cosine_similarity(&va, &vb) as f64;
    Ok(round2((cosine * 100.0).clamp(0.0, 100.0)))
}

pub fn compute_tfidf_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let rows = TfidfVectorizer::default().fit_transform(&[a, b]);
    round2((sparse_cosine(&rows[0], &rows[1]) * 100.0).clamp(0.0, 100.0))
}

pub fn compute_semantic_similarity_detailed(
    a: &str,
    b: &str,
    embedder: Option<&dyn Embedder>,
) -> DetailedSimilarity {
    let basic = compute_similarity(a, b, embedder);
    let tfidf = compute_tfidf_similarity(a, b);

    let mut sentence_scores = Vec::new();
    if embedder.is_some_and(|e| e.is_available()) {
        let left = split_sentences(a);
        let right = split_sentences(b);
        for s1 in left.iter().take(MAX_SENTENCES) {
            for s2 in right.iter().take(MAX_SENTENCES) {
                sentence_scores.push(compute_similarity(s1, s2, embedder));
            }
        }
    }

    let (avg, max) = if sentence_scores.is_empty() {
        (basic, basic)
    } else {
        let sum: f64 = sentence_scores.iter().sum();
        let max = sentence_scores.iter().copied().fold(f64::MIN, f64::max);
        (sum / sentence_scores.len() as f64, max)
    };

    DetailedSimilarity {
        overall_similarity: basic,
        tfidf_similarity: tfidf,
        avg_sentence_similarity: round2(avg),
        max_sentence_similarity: round2(max),
        similarity_confidence: round2(basic.min(tfidf) / basic.max(tfidf).max(1.0) * 100.0),
    }
}

/// One score per text against `reference`, in input order.
pub fn batch_similarity(texts: &[String], reference: &str, embedder: Option<&dyn Embedder>) -> Vec<f64> {
    if reference.trim().is_empty() {
        return vec![0.0; texts.len()];
    }
    texts
        .iter()
        .map(|text| compute_similarity(text, reference, embedder))
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
