use anyhow::{bail, Context, Result};
use std::str::FromStr;

use crate::matching::embedding::DEFAULT_DIMENSION;
use crate::matching::skills::DEFAULT_FUZZY_THRESHOLD;
use crate::matching::suggestions::DEFAULT_CRITICAL_KEYWORDS;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_MIN_JD_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Feature-hashing embedder built into the crate.
    Hash,
    /// No embeddings; similarity is TF-IDF only.
    None,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "none" | "off" => Ok(Self::None),
            other => bail!("unknown embedding backend '{other}' (expected hash or none)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageBackend {
    Rules,
    None,
}

impl FromStr for LanguageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(Self::Rules),
            "none" | "off" => Ok(Self::None),
            other => bail!("unknown language analysis backend '{other}' (expected rules or none)"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; see `Default` for the fallback values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub min_jd_chars: usize,
    pub fuzzy_threshold: f64,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_dimension: usize,
    pub language_analysis: LanguageBackend,
    pub critical_skills: Vec<String>,
    pub scale_section_scores: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            min_jd_chars: DEFAULT_MIN_JD_CHARS,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            embedding_backend: EmbeddingBackend::Hash,
            embedding_dimension: DEFAULT_DIMENSION,
            language_analysis: LanguageBackend::Rules,
            critical_skills: DEFAULT_CRITICAL_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scale_section_scores: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            min_jd_chars: parse_or(&lookup, "MIN_JD_CHARS", defaults.min_jd_chars)?,
            fuzzy_threshold: parse_or(&lookup, "FUZZY_THRESHOLD", defaults.fuzzy_threshold)?,
            embedding_backend: parse_or(&lookup, "EMBEDDING_BACKEND", defaults.embedding_backend)?,
            embedding_dimension: parse_or(
                &lookup,
                "EMBEDDING_DIMENSION",
                defaults.embedding_dimension,
            )?,
            language_analysis: parse_or(&lookup, "LANGUAGE_ANALYSIS", defaults.language_analysis)?,
            critical_skills: lookup("CRITICAL_SKILLS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.critical_skills),
            scale_section_scores: parse_or(
                &lookup,
                "SCALE_SECTION_SCORES",
                defaults.scale_section_scores,
            )?,
        };

        if !(0.0..=100.0).contains(&config.fuzzy_threshold) {
            bail!("FUZZY_THRESHOLD must be between 0 and 100");
        }
        if config.embedding_dimension == 0 {
            bail!("EMBEDDING_DIMENSION must be greater than zero");
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}
