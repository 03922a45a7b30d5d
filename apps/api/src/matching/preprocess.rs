//! Text normalization applied to extracted documents before matching.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::matching::language::LanguageAnalyzer;
use crate::matching::text::is_stop_word;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,()]").expect("valid character-class regex"));

/// Collapses whitespace and replaces characters other than word characters,
/// whitespace and `- . , ( )` with a space.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let stripped = DISALLOWED_RE.replace_all(&collapsed, " ");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Cleans `text` and rewrites it as space-joined lemmas.
///
/// Without an analyzer (or when analysis fails) the cleaned text is lower-cased instead.
pub fn advanced_text_preprocessing(
    text: &str,
    analyzer: Option<&dyn LanguageAnalyzer>,
    remove_stopwords: bool,
) -> String {
    let cleaned = clean_text(text);

    let Some(analyzer) = analyzer else {
        return cleaned.to_lowercase();
    };

    match analyzer.analyze(&cleaned) {
        Ok(analysis) => analysis
            .lemmas
            .into_iter()
            .filter(|lemma| !(remove_stopwords && is_stop_word(lemma)))
            .collect::<Vec<_>>()
            .join(" "),
        Err(e) => {
            warn!("Language analysis failed during preprocessing, using plain cleanup: {e}");
            cleaned.to_lowercase()
        }
    }
}
