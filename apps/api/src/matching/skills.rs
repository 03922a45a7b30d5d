//! Skill Extractor: finds vocabulary skills in free text.
//!
//! Algorithm:
//! 1. exact: canonical skill occurs as a substring of the lower-cased text
//! 2. candidate pool: short noun phrases, then ORG/PRODUCT/LANGUAGE entities (when a
//!    language analyzer is available), then every word token; first-seen order, deduplicated
//! 3. fuzzy: for each candidate longer than 2 chars, the best-scoring not-yet-exact skill
//!    (indel ratio, 0–100) is accepted if it reaches the threshold
//! 4. synonym backfill: an unmatched canonical skill whose alias occurs as a substring
//!    is added to the exact matches
//! 5. categorize against the vocabulary categories

use std::collections::{BTreeMap, BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use rapidfuzz::fuzz;
use tracing::{debug, warn};

use crate::matching::language::{EntityLabel, LanguageAnalyzer};
use crate::matching::vocabulary::SkillVocabulary;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;

/// Noun phrases longer than this are too unspecific to be a skill.
const MAX_PHRASE_WORDS: usize = 3;
/// Candidates of this many characters or fewer are never fuzzy-matched.
const MIN_CANDIDATE_CHARS: usize = 2;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillExtractionResult {
    pub exact_matches: BTreeSet<String>,
    pub fuzzy_matches: BTreeSet<String>,
    pub by_category: BTreeMap<String, BTreeSet<String>>,
}

impl SkillExtractionResult {
    /// Union of exact and fuzzy matches.
    pub fn all(&self) -> BTreeSet<String> {
        self.exact_matches
            .union(&self.fuzzy_matches)
            .cloned()
            .collect()
    }
}

/// Indel similarity `2·matches / (len_a + len_b)` on a 0–100 scale, so a shortened
/// form ("mongo") stays close to its full skill name ("mongodb").
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

pub fn extract_skills(
    text: &str,
    vocabulary: &SkillVocabulary,
    analyzer: Option<&dyn LanguageAnalyzer>,
    fuzzy_threshold: f64,
) -> SkillExtractionResult {
    let text_lower = text.to_lowercase();
    let mut result = SkillExtractionResult::default();

    for skill in vocabulary.all_skills() {
        if text_lower.contains(skill.as_str()) {
            result.exact_matches.insert(skill.clone());
        }
    }

    let remaining: Vec<&str> = vocabulary
        .all_skills()
        .iter()
        .filter(|s| !result.exact_matches.contains(*s))
        .map(String::as_str)
        .collect();

    if !remaining.is_empty() {
        for candidate in candidate_pool(text, &text_lower, analyzer) {
            if candidate.chars().count() <= MIN_CANDIDATE_CHARS {
                continue;
            }
            if let Some(skill) = best_match(&candidate, &remaining, fuzzy_threshold) {
                result.fuzzy_matches.insert(skill.to_string());
            }
        }
    }

    for (canonical, aliases) in vocabulary.synonyms() {
        if result.exact_matches.contains(canonical) || result.fuzzy_matches.contains(canonical) {
            continue;
        }
        if aliases.iter().any(|alias| text_lower.contains(alias.as_str())) {
            result.exact_matches.insert(canonical.clone());
        }
    }

    let found = result.all();
    for (category, skills) in vocabulary.skills_by_category() {
        let in_category: BTreeSet<String> = skills.intersection(&found).cloned().collect();
        if !in_category.is_empty() {
            result.by_category.insert(category.clone(), in_category);
        }
    }

    debug!(
        exact = result.exact_matches.len(),
        fuzzy = result.fuzzy_matches.len(),
        categories = result.by_category.len(),
        "Skill extraction complete"
    );

    result
}

/// First skill (in vocabulary order) with the highest ratio, if it reaches `threshold`.
fn best_match<'a>(candidate: &str, skills: &[&'a str], threshold: f64) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for &skill in skills {
        let ratio = fuzzy_ratio(candidate, skill);
        if best.map_or(true, |(_, top)| ratio > top) {
            best = Some((skill, ratio));
        }
    }
    best.filter(|(_, ratio)| *ratio >= threshold)
        .map(|(skill, _)| skill)
}

/// Ordered, deduplicated pool of lower-cased phrases that might name a skill.
fn candidate_pool(
    text: &str,
    text_lower: &str,
    analyzer: Option<&dyn LanguageAnalyzer>,
) -> Vec<String> {
    let mut pool = Vec::new();

    if let Some(analyzer) = analyzer {
        match analyzer.analyze(text) {
            Ok(analysis) => {
                pool.extend(
                    analysis
                        .noun_phrases
                        .iter()
                        .filter(|p| p.split_whitespace().count() <= MAX_PHRASE_WORDS)
                        .map(|p| p.to_lowercase()),
                );
                pool.extend(
                    analysis
                        .entities
                        .iter()
                        .filter(|e| {
                            matches!(
                                e.label,
                                EntityLabel::Organization | EntityLabel::Product | EntityLabel::Language
                            )
                        })
                        .map(|e| e.text.to_lowercase()),
                );
            }
            Err(e) => {
                warn!("Language analysis unavailable for skill extraction ({e}); using word tokens only");
            }
        }
    }

    pool.extend(WORD_RE.find_iter(text_lower).map(|m| m.as_str().to_string()));

    let mut seen = HashSet::new();
    pool.retain(|candidate| seen.insert(candidate.clone()));
    pool
}
