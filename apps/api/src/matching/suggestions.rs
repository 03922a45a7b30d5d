//! Improvement suggestions and keyword density for a resume against a JD.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::error::MatchError;
use crate::matching::scoring::ExperienceMatch;
use crate::matching::text::round2;

/// Suggestions list at most this many skills in their description.
const MAX_LISTED_SKILLS: usize = 5;
/// Density is reported for at most this many JD skills.
const MAX_DENSITY_KEYWORDS: usize = 10;
const EXPERIENCE_SUGGESTION_BELOW: f64 = 80.0;
/// Resume skill count below this fraction of the JD's triggers the keyword suggestion.
const KEYWORD_COVERAGE_RATIO: f64 = 0.5;

pub const DEFAULT_CRITICAL_KEYWORDS: &[&str] =
    &["python", "java", "sql", "aws", "react", "machine learning"];

/// Missing skills whose name contains any of these keywords are flagged as critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalSkillPolicy {
    keywords: Vec<String>,
}

impl CriticalSkillPolicy {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_critical(&self, skill: &str) -> bool {
        let skill = skill.to_lowercase();
        self.keywords.iter().any(|k| skill.contains(k.as_str()))
    }

    #[allow(dead_code)]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for CriticalSkillPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CRITICAL_KEYWORDS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    CriticalSkills,
    AdditionalSkills,
    Experience,
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensity {
    pub count: usize,
    /// Occurrences per 100 words, two decimals.
    pub density: f64,
}

pub fn generate_improvement_suggestions(
    resume_skills: &BTreeSet<String>,
    jd_skills: &BTreeSet<String>,
    experience: &ExperienceMatch,
    policy: &CriticalSkillPolicy,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let (critical, nice_to_have): (Vec<&str>, Vec<&str>) = jd_skills
        .difference(resume_skills)
        .map(String::as_str)
        .partition(|skill| policy.is_critical(skill));

    if !critical.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::CriticalSkills,
            title: "Critical Skills Missing".to_string(),
            description: format!(
                "Add these important skills to your resume: {}",
                list_skills(&critical)
            ),
            priority: Priority::High,
        });
    }

    if !nice_to_have.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::AdditionalSkills,
            title: "Additional Skills to Consider".to_string(),
            description: format!(
                "Consider highlighting these skills if you have them: {}",
                list_skills(&nice_to_have)
            ),
            priority: Priority::Medium,
        });
    }

    if experience.overall_experience_score < EXPERIENCE_SUGGESTION_BELOW
        && experience.years_match_score < EXPERIENCE_SUGGESTION_BELOW
    {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Experience,
            title: "Experience Level".to_string(),
            description: "Highlight relevant experience more prominently or consider gaining more experience in the required areas".to_string(),
            priority: Priority::High,
        });
    }

    if (resume_skills.len() as f64) < jd_skills.len() as f64 * KEYWORD_COVERAGE_RATIO {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Keywords,
            title: "Keyword Optimization".to_string(),
            description: "Include more relevant keywords from the job description in your resume"
                .to_string(),
            priority: Priority::Medium,
        });
    }

    suggestions
}

fn list_skills(skills: &[&str]) -> String {
    skills
        .iter()
        .take(MAX_LISTED_SKILLS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whole-word occurrence count and density of the first ten `keywords` in `text`.
pub fn calculate_keyword_density(
    text: &str,
    keywords: &BTreeSet<String>,
) -> Result<BTreeMap<String, KeywordDensity>, MatchError> {
    let text_lower = text.to_lowercase();
    let word_count = text_lower.split_whitespace().count();

    keywords
        .iter()
        .take(MAX_DENSITY_KEYWORDS)
        .map(|keyword| {
            let pattern = format!(r"\b{}\b", regex::escape(&keyword.to_lowercase()));
            let re = Regex::new(&pattern).map_err(|e| {
                MatchError::Computation(format!("keyword pattern for {keyword:?}: {e}"))
            })?;
            let count = re.find_iter(&text_lower).count();
            let density = if word_count > 0 {
                round2(count as f64 / word_count as f64 * 100.0)
            } else {
                0.0
            };
            Ok((keyword.clone(), KeywordDensity { count, density }))
        })
        .collect()
}
