//! Experience / Education Inferencer: pattern rules over free text.

use std::collections::BTreeSet;
use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::text::round1;

/// Applied in order; every capture from every pattern is kept.
static YEARS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+)\+?\s*years?\s*(?:of\s*)?experience",
        r"(\d+)\+?\s*yrs?\s*(?:of\s*)?experience",
        r"experience.*?(\d+)\+?\s*years?",
        r"(\d+)\+?\s*years?\s*in",
        r"over\s*(\d+)\s*years?",
        r"more\s*than\s*(\d+)\s*years?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid years pattern"))
    .collect()
});

static INSTITUTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"university of \w+",
        r"\w+ university",
        r"\w+ college",
        r"\w+ institute",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid institution pattern"))
    .collect()
});

const LEVEL_KEYWORDS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Entry,
        &["entry level", "junior", "graduate", "fresher", "trainee", "intern"],
    ),
    (
        ExperienceLevel::Mid,
        &["mid level", "intermediate", "experienced", "specialist"],
    ),
    (
        ExperienceLevel::Senior,
        &["senior", "lead", "principal", "staff", "expert"],
    ),
    (
        ExperienceLevel::Executive,
        &[
            "director", "manager", "head", "chief", "vp", "vice president", "ceo", "cto", "cfo",
        ],
    ),
];

const DEGREE_KEYWORDS: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::Phd, &["ph.d", "phd", "doctorate", "doctoral"]),
    (
        DegreeLevel::Masters,
        &["master", "msc", "m.sc", "ma", "m.a", "mba", "m.b.a", "mtech", "m.tech"],
    ),
    (
        DegreeLevel::Bachelors,
        &["bachelor", "bsc", "b.sc", "ba", "b.a", "btech", "b.tech", "be", "b.e"],
    ),
    (
        DegreeLevel::Associates,
        &["associate", "diploma", "certification"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    Phd,
    Masters,
    Bachelors,
    Associates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceProfile {
    /// In pattern order, then match order within each pattern.
    pub years_mentioned: Vec<u32>,
    pub max_years: u32,
    /// Rounded to one decimal.
    pub average_years: f64,
    pub levels_detected: BTreeSet<ExperienceLevel>,
    pub inferred_level: ExperienceLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationInfo {
    pub degrees: BTreeSet<DegreeLevel>,
    pub institutions: BTreeSet<String>,
}

pub fn extract_experience_level(text: &str) -> ExperienceProfile {
    let text_lower = text.to_lowercase();

    let years_mentioned: Vec<u32> = YEARS_PATTERNS
        .iter()
        .flat_map(|re| {
            re.captures_iter(&text_lower)
                .filter_map(|caps| caps.get(1).and_then(|m| parse_years(m.as_str())))
                .collect::<Vec<_>>()
        })
        .collect();

    let levels_detected = LEVEL_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(level, _)| *level)
        .collect();

    let max_years = years_mentioned.iter().copied().max().unwrap_or(0);
    let average_years = if years_mentioned.is_empty() {
        0.0
    } else {
        let sum: f64 = years_mentioned.iter().map(|y| *y as f64).sum();
        round1(sum / years_mentioned.len() as f64)
    };

    ExperienceProfile {
        years_mentioned,
        max_years,
        average_years,
        levels_detected,
        inferred_level: infer_level_from_years(max_years),
    }
}

/// Counts too large for `u32` saturate rather than being dropped.
fn parse_years(digits: &str) -> Option<u32> {
    match digits.parse::<u32>() {
        Ok(years) => Some(years),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    }
}

/// 0–2 → entry, 3–5 → mid, 6–10 → senior, above 10 → executive.
pub fn infer_level_from_years(years: u32) -> ExperienceLevel {
    match years {
        0..=2 => ExperienceLevel::Entry,
        3..=5 => ExperienceLevel::Mid,
        6..=10 => ExperienceLevel::Senior,
        _ => ExperienceLevel::Executive,
    }
}

pub fn extract_education(text: &str) -> EducationInfo {
    let text_lower = text.to_lowercase();

    let degrees = DEGREE_KEYWORDS
        .iter()
        .filter(|(_, variants)| variants.iter().any(|v| text_lower.contains(v)))
        .map(|(degree, _)| *degree)
        .collect();

    let institutions = INSTITUTION_PATTERNS
        .iter()
        .flat_map(|re| {
            re.find_iter(&text_lower)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    EducationInfo {
        degrees,
        institutions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_level_boundaries() {
        assert_eq!(infer_level_from_years(0), ExperienceLevel::Entry);
        assert_eq!(infer_level_from_years(2), ExperienceLevel::Entry);
        assert_eq!(infer_level_from_years(3), ExperienceLevel::Mid);
        assert_eq!(infer_level_from_years(5), ExperienceLevel::Mid);
        assert_eq!(infer_level_from_years(6), ExperienceLevel::Senior);
        assert_eq!(infer_level_from_years(10), ExperienceLevel::Senior);
        assert_eq!(infer_level_from_years(11), ExperienceLevel::Executive);
    }

    #[test]
    fn test_years_from_resume_and_jd() {
        let resume = extract_experience_level("5 years experience, Python developer");
        assert_eq!(resume.max_years, 5);
        assert_eq!(resume.inferred_level, ExperienceLevel::Mid);

        let jd = extract_experience_level("Looking for 3+ years experience with Python and AWS");
        assert_eq!(jd.max_years, 3);
    }

    #[test]
    fn test_all_patterns_contribute() {
        let profile = extract_experience_level(
            "Over 7 years in backend work; more than 4 years of Go. 2 yrs experience leading teams.",
        );
        // "7 years in", "over 7 years", "more than 4 years", "2 yrs experience"
        assert!(profile.years_mentioned.contains(&7));
        assert!(profile.years_mentioned.contains(&4));
        assert!(profile.years_mentioned.contains(&2));
        assert_eq!(profile.max_years, 7);
        assert_eq!(profile.inferred_level, ExperienceLevel::Senior);
    }

    #[test]
    fn test_average_years_rounded() {
        let profile = extract_experience_level("over 3 years. over 4 years. over 4 years.");
        assert_eq!(profile.years_mentioned, vec![3, 4, 4]);
        assert_eq!(profile.average_years, 3.7);
    }

    #[test]
    fn test_oversized_year_count_saturates() {
        let profile = extract_experience_level("99999999999 years experience and 4 years in Go");
        assert_eq!(profile.years_mentioned[0], u32::MAX);
        assert!(profile.years_mentioned.contains(&4));
        assert_eq!(profile.max_years, u32::MAX);
        assert_eq!(profile.inferred_level, ExperienceLevel::Executive);
    }

    #[test]
    fn test_no_years_is_entry_with_zero() {
        let profile = extract_experience_level("Passionate engineer");
        assert!(profile.years_mentioned.is_empty());
        assert_eq!(profile.max_years, 0);
        assert_eq!(profile.average_years, 0.0);
        assert_eq!(profile.inferred_level, ExperienceLevel::Entry);
    }

    #[test]
    fn test_multiple_levels_detected() {
        let profile = extract_experience_level("Senior engineer who will grow into an engineering manager");
        assert!(profile.levels_detected.contains(&ExperienceLevel::Senior));
        assert!(profile.levels_detected.contains(&ExperienceLevel::Executive));
        assert!(!profile.levels_detected.contains(&ExperienceLevel::Entry));
    }

    #[test]
    fn test_levels_serialize_lowercase() {
        let json = serde_json::to_string(&ExperienceLevel::Executive).unwrap();
        assert_eq!(json, "\"executive\"");
    }

    #[test]
    fn test_extract_education() {
        let info = extract_education("PhD from Stanford University, BSc at University of Toronto");
        assert!(info.degrees.contains(&DegreeLevel::Phd));
        assert!(info.degrees.contains(&DegreeLevel::Bachelors));
        assert!(info.institutions.contains("stanford university"));
        assert!(info.institutions.contains("university of toronto"));
    }

    #[test]
    fn test_extract_education_empty() {
        let info = extract_education("12345");
        assert!(info.degrees.is_empty());
        assert!(info.institutions.is_empty());
    }
}
