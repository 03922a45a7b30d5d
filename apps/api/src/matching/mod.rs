// Resume ↔ job description matching engine.
// Pure, synchronous core (vocabulary, extraction, similarity, scoring, suggestions)
// plus the HTTP handlers that feed it. Optional capabilities (embedding, language
// analysis) are injected into `Matcher`; when missing, the core falls back silently.

pub mod embedding;
pub mod error;
pub mod experience;
pub mod handlers;
pub mod language;
pub mod matcher;
pub mod preprocess;
pub mod scoring;
pub mod sections;
pub mod similarity;
pub mod skills;
pub mod suggestions;
pub mod text;
pub mod tfidf;
pub mod vocabulary;
