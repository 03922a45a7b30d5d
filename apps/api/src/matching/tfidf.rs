//! TF-IDF vectorizer used as the lexical similarity fallback.
//!
//! Mirrors the usual text-mining setup: tokens of two or more word characters,
//! English stop words removed, unigrams + bigrams, vocabulary capped by corpus
//! frequency, smoothed IDF, L2-normalized rows.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matching::text::is_stop_word;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid tfidf token regex"));

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }

    /// Fits on `documents` and returns one L2-normalized sparse row per document.
    pub fn fit_transform(&self, documents: &[&str]) -> Vec<BTreeMap<String, f64>> {
        let term_counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| count_terms(doc)).collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for (term, count) in counts {
                *corpus_freq.entry(term.as_str()).or_default() += count;
                *doc_freq.entry(term.as_str()).or_default() += 1;
            }
        }

        // Highest corpus frequency first; ties broken alphabetically so the cap is stable.
        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let n_docs = documents.len() as f64;
        let idf: HashMap<&str, f64> = ranked
            .iter()
            .map(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                (*term, ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0)
            })
            .collect();

        term_counts
            .iter()
            .map(|counts| {
                let mut row: BTreeMap<String, f64> = counts
                    .iter()
                    .filter_map(|(term, count)| {
                        idf.get(term.as_str())
                            .map(|w| (term.clone(), *count as f64 * w))
                    })
                    .collect();
                let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for v in row.values_mut() {
                        *v /= norm;
                    }
                }
                row
            })
            .collect()
    }
}

/// Cosine similarity of two L2-normalized sparse rows.
pub fn sparse_cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, va)| large.get(term).map(|vb| va * vb))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

fn count_terms(document: &str) -> HashMap<String, usize> {
    let lower = document.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in &tokens {
        *counts.entry((*token).to_string()).or_default() += 1;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
    }
    counts
}
