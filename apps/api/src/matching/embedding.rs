//! Embedding capability: turns a text span into a fixed-length vector.
//!
//! `HashEmbedder` is the built-in backend (feature hashing, deterministic, no model files).
//! `LazyEmbedder` defers construction of an expensive backend to the first call and
//! remembers a failed initialization so callers fall back to TF-IDF.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use siphasher::sip::SipHasher13;
use tracing::{info, warn};

use crate::matching::error::CapabilityError;

/// Fixed keys keep vectors stable across processes and toolchain versions.
/// Changing them changes every embedding.
const HASH_SEED_K0: u64 = 0x5265_7375_6d65_4d61;
const HASH_SEED_K1: u64 = 0x7463_6865_7248_7368;

pub const DEFAULT_DIMENSION: usize = 384;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;

    /// False when the backend could not be loaded and every `embed` call will fail.
    fn is_available(&self) -> bool {
        true
    }
}

/// Deterministic feature-hashing embedder over lower-cased unigrams and bigrams.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = self.hash_token(feature);
        let idx = (hash % self.dimension as u64) as usize;
        // Sign bit taken from the high half so it is independent of the bucket
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();

        let mut vector = vec![0.0f32; self.dimension];
        for token in &tokens {
            self.accumulate(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }
}

type EmbedderInit = Box<dyn Fn() -> Result<Arc<dyn Embedder>, CapabilityError> + Send + Sync>;

/// Runs `init` on first use. A failed initialization is cached as `None`
/// and every later call reports `Unavailable`.
pub struct LazyEmbedder {
    label: &'static str,
    dimension: usize,
    init: EmbedderInit,
    cell: OnceCell<Option<Arc<dyn Embedder>>>,
}

impl LazyEmbedder {
    pub fn new<F>(label: &'static str, dimension: usize, init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>, CapabilityError> + Send + Sync + 'static,
    {
        Self {
            label,
            dimension,
            init: Box::new(init),
            cell: OnceCell::new(),
        }
    }

    fn backend(&self) -> Option<&Arc<dyn Embedder>> {
        self.cell
            .get_or_init(|| match (self.init)() {
                Ok(embedder) => {
                    info!("Embedding backend '{}' initialized", embedder.name());
                    Some(embedder)
                }
                Err(e) => {
                    warn!("Embedding backend '{}' failed to initialize: {e}", self.label);
                    None
                }
            })
            .as_ref()
    }
}

impl Embedder for LazyEmbedder {
    fn name(&self) -> &'static str {
        self.label
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        match self.backend() {
            Some(embedder) => embedder.embed(text),
            None => Err(CapabilityError::Unavailable("embedding")),
        }
    }

    fn is_available(&self) -> bool {
        self.backend().is_some_and(|embedder| embedder.is_available())
    }
}

/// Cosine similarity in [-1, 1]. Returns 0.0 on dimension mismatch or a zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
