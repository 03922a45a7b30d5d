use std::sync::Arc;

use tracing::info;

use crate::config::{Config, EmbeddingBackend, LanguageBackend};
use crate::matching::embedding::{Embedder, HashEmbedder, LazyEmbedder};
use crate::matching::language::RuleBasedAnalyzer;
use crate::matching::matcher::{MatchSettings, Matcher};
use crate::matching::scoring::ScoringWeights;
use crate::matching::suggestions::CriticalSkillPolicy;
use crate::matching::vocabulary::SkillVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only matcher shared by every request. Scoring runs on the blocking pool.
    pub matcher: Arc<Matcher>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let matcher = Arc::new(build_matcher(&config));
        Self { config, matcher }
    }
}

/// Assembles the matcher and its capabilities from configuration.
pub fn build_matcher(config: &Config) -> Matcher {
    let settings = MatchSettings {
        fuzzy_threshold: config.fuzzy_threshold,
        weights: ScoringWeights {
            scale_sections: config.scale_section_scores,
            ..Default::default()
        },
        critical_skills: CriticalSkillPolicy::new(&config.critical_skills),
    };

    let mut matcher = Matcher::new(Arc::new(SkillVocabulary::builtin()), settings);

    match config.embedding_backend {
        EmbeddingBackend::Hash => {
            let dimension = config.embedding_dimension;
            matcher = matcher.with_embedder(Arc::new(LazyEmbedder::new(
                "hash",
                dimension,
                move || Ok(Arc::new(HashEmbedder::new(dimension)) as Arc<dyn Embedder>),
            )));
            info!("Embedding backend: hash ({dimension} dims, initialized on first use)");
        }
        EmbeddingBackend::None => info!("Embedding backend disabled; using TF-IDF similarity"),
    }

    match config.language_analysis {
        LanguageBackend::Rules => {
            matcher = matcher.with_analyzer(Arc::new(RuleBasedAnalyzer));
            info!("Language analysis: rule-based");
        }
        LanguageBackend::None => info!("Language analysis disabled"),
    }

    matcher
}
