//! Language-analysis capability: lemmas, named entities, and noun phrases.
//!
//! The core treats this as a black box. `RuleBasedAnalyzer` is the built-in
//! backend: no model, purely lexical rules, deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::error::CapabilityError;
use crate::matching::text::is_stop_word;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    // Words (keeping inner . + # - so "node.js", "c++", "objective-c" survive) or
    // a single punctuation character.
    Regex::new(r"[\w][\w.+#\-]*[\w+#]|\w|[^\w\s]").expect("valid token regex")
});

const ORGANIZATION_SUFFIXES: &[&str] = &[
    "inc", "inc.", "corp", "corp.", "corporation", "llc", "ltd", "ltd.", "university",
    "college", "institute", "labs", "group", "technologies", "systems",
];

const NATURAL_LANGUAGES: &[&str] = &[
    "english", "spanish", "french", "german", "mandarin", "chinese", "japanese", "korean",
    "hindi", "arabic", "portuguese", "russian", "italian", "dutch",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Organization,
    Product,
    Language,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Lower-cased base forms, punctuation excluded, in text order.
    pub lemmas: Vec<String>,
    pub entities: Vec<Entity>,
    /// In text order, original casing.
    pub noun_phrases: Vec<String>,
}

pub trait LanguageAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze(&self, text: &str) -> Result<Analysis, CapabilityError>;
}

/// Lexical approximation of a tagger/chunker.
///
/// - lemma: the lower-cased token
/// - noun phrase: a maximal run of non-stop-word tokens between stop words or punctuation
/// - entity: a maximal run of capitalized tokens
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAnalyzer;

impl LanguageAnalyzer for RuleBasedAnalyzer {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn analyze(&self, text: &str) -> Result<Analysis, CapabilityError> {
        let tokens: Vec<&str> = TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect();

        let lemmas = tokens
            .iter()
            .filter(|t| is_word(t))
            .map(|t| t.to_lowercase())
            .collect();

        Ok(Analysis {
            lemmas,
            entities: collect_entities(&tokens),
            noun_phrases: collect_noun_phrases(&tokens),
        })
    }
}

fn is_word(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

fn collect_noun_phrases(tokens: &[&str]) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for &token in tokens {
        if is_word(token) && !is_stop_word(&token.to_lowercase()) {
            current.push(token);
        } else if !current.is_empty() {
            phrases.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        phrases.push(current.join(" "));
    }

    phrases
}

fn collect_entities(tokens: &[&str]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |current: &mut Vec<&str>| {
        if !current.is_empty() {
            entities.push(classify_entity(current));
            current.clear();
        }
    };

    for &token in tokens {
        if is_word(token) && is_capitalized(token) {
            current.push(token);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    entities
}

fn classify_entity(tokens: &[&str]) -> Entity {
    let text = tokens.join(" ");
    let last = tokens.last().map(|t| t.to_lowercase()).unwrap_or_default();

    let label = if ORGANIZATION_SUFFIXES.contains(&last.as_str())
        || tokens.first().is_some_and(|t| t.eq_ignore_ascii_case("university"))
    {
        EntityLabel::Organization
    } else if tokens.len() == 1 && NATURAL_LANGUAGES.contains(&last.as_str()) {
        EntityLabel::Language
    } else if tokens.len() <= 3 {
        EntityLabel::Product
    } else {
        EntityLabel::Other
    };

    Entity { text, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lemmas_are_lowercase_words_only() {
        let analysis = RuleBasedAnalyzer.analyze("Built APIs, with Node.js!").unwrap();
        assert_eq!(analysis.lemmas, vec!["built", "apis", "with", "node.js"]);
    }

    #[test]
    fn test_noun_phrases_split_on_stop_words_and_punctuation() {
        let analysis = RuleBasedAnalyzer
            .analyze("Experience with machine learning, data pipelines and Kafka")
            .unwrap();
        assert_eq!(
            analysis.noun_phrases,
            vec!["Experience", "machine learning", "data pipelines", "Kafka"]
        );
    }

    #[test]
    fn test_entities_are_classified() {
        let analysis = RuleBasedAnalyzer
            .analyze("worked at Acme Labs using Spring Boot, fluent in Spanish")
            .unwrap();
        let acme = analysis.entities.iter().find(|e| e.text == "Acme Labs").unwrap();
        assert_eq!(acme.label, EntityLabel::Organization);
        let spring = analysis.entities.iter().find(|e| e.text == "Spring Boot").unwrap();
        assert_eq!(spring.label, EntityLabel::Product);
        let spanish = analysis.entities.iter().find(|e| e.text == "Spanish").unwrap();
        assert_eq!(spanish.label, EntityLabel::Language);
    }

    #[test]
    fn test_keeps_symbol_heavy_tokens() {
        let analysis = RuleBasedAnalyzer.analyze("c++ and c# and objective-c").unwrap();
        assert_eq!(analysis.lemmas, vec!["c++", "and", "c#", "and", "objective-c"]);
    }
}
