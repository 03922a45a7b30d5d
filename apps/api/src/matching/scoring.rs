//! Score arithmetic for the match orchestrator: section weighting, experience
//! comparison, and the final weighted score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::embedding::Embedder;
use crate::matching::experience::ExperienceProfile;
use crate::matching::sections::{Section, SectionMap};
use crate::matching::similarity::compute_similarity;

/// Section weights; they sum to 1.0.
pub const SECTION_WEIGHTS: &[(Section, f64)] = &[
    (Section::Skills, 0.35),
    (Section::Experience, 0.30),
    (Section::Education, 0.15),
    (Section::Projects, 0.10),
    (Section::Certifications, 0.10),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub skill: f64,
    pub experience: f64,
    /// Outer weight for the section block. Only applied when `scale_sections` is set;
    /// by default the section sum is added unscaled.
    pub sections: f64,
    pub scale_sections: bool,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.25,
            skill: 0.35,
            experience: 0.25,
            sections: 0.15,
            scale_sections: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMatch {
    pub years_match_score: f64,
    pub level_match_score: f64,
    pub resume_experience: ExperienceProfile,
    pub jd_requirements: ExperienceProfile,
    pub overall_experience_score: f64,
}

/// Similarity per weighted section; a section missing on either side scores 0.
pub fn calculate_section_scores(
    resume_sections: &SectionMap,
    jd_sections: &SectionMap,
    embedder: Option<&dyn Embedder>,
) -> BTreeMap<Section, SectionScore> {
    SECTION_WEIGHTS
        .iter()
        .map(|(section, weight)| {
            let resume_text = resume_sections.get(*section);
            let jd_text = jd_sections.get(*section);

            let score = if !resume_text.is_empty() && !jd_text.is_empty() {
                compute_similarity(resume_text, jd_text, embedder).clamp(0.0, 100.0)
            } else {
                0.0
            };

            (
                *section,
                SectionScore {
                    score,
                    weight: *weight,
                    weighted_score: (score / 100.0) * weight,
                },
            )
        })
        .collect()
}

/// 100 when the JD asks for nothing or the resume meets it; otherwise partial credit
/// at 70% (80) and 50% (60) of the requirement, else 40.
pub fn years_match_score(resume_max_years: u32, jd_max_years: u32) -> f64 {
    let resume = resume_max_years as f64;
    let required = jd_max_years as f64;

    if jd_max_years == 0 || resume_max_years >= jd_max_years {
        100.0
    } else if resume >= required * 0.7 {
        80.0
    } else if resume >= required * 0.5 {
        60.0
    } else {
        40.0
    }
}

pub fn analyze_experience_match(resume: ExperienceProfile, jd: ExperienceProfile) -> ExperienceMatch {
    let years_match = years_match_score(resume.max_years, jd.max_years);

    let level_match = if jd.levels_detected.is_empty() {
        100.0
    } else {
        let common = resume
            .levels_detected
            .intersection(&jd.levels_detected)
            .count();
        common as f64 / jd.levels_detected.len() as f64 * 100.0
    };

    ExperienceMatch {
        years_match_score: years_match,
        level_match_score: level_match,
        overall_experience_score: (years_match + level_match) / 2.0,
        resume_experience: resume,
        jd_requirements: jd,
    }
}

/// |common| / |jd| × 100, or 100 when the JD names no skills.
pub fn skill_match_score(common: usize, jd_total: usize) -> f64 {
    if jd_total == 0 {
        100.0
    } else {
        (common as f64 / jd_total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Weighted combination on a 0–100 scale, clamped.
///
/// With `scale_sections` off the section weighted scores (summing to at most 1.0)
/// are added as-is, so the unclamped value can exceed 100.
pub fn final_score(
    weights: &ScoringWeights,
    semantic: f64,
    skill_match: f64,
    experience: f64,
    section_scores: &BTreeMap<Section, SectionScore>,
) -> f64 {
    let section_sum: f64 = section_scores.values().map(|s| s.weighted_score).sum();
    let section_term = if weights.scale_sections {
        section_sum * weights.sections
    } else {
        section_sum
    };

    let raw = (semantic / 100.0) * weights.semantic
        + (skill_match / 100.0) * weights.skill
        + (experience / 100.0) * weights.experience
        + section_term;

    (raw * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::experience::{extract_experience_level, ExperienceLevel};

    fn sections_with(skills: &str, experience: &str) -> SectionMap {
        SectionMap {
            skills: skills.to_string(),
            experience: experience.to_string(),
            ..Default::default()
        }
    }

    fn score_map(values: &[(Section, f64)]) -> BTreeMap<Section, SectionScore> {
        values
            .iter()
            .map(|(section, weighted)| {
                (
                    *section,
                    SectionScore {
                        score: 0.0,
                        weight: 0.0,
                        weighted_score: *weighted,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_section_weights_sum_to_one() {
        let total: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_section_scores_cover_all_weighted_sections() {
        let resume = sections_with("Skills: rust kafka", "");
        let jd = sections_with("Skills: rust kafka", "Experience: 5 years");
        let scores = calculate_section_scores(&resume, &jd, None);

        assert_eq!(scores.len(), SECTION_WEIGHTS.len());
        let skills = &scores[&Section::Skills];
        assert!((skills.score - 100.0).abs() < 0.01);
        assert!((skills.weighted_score - 0.35).abs() < 1e-4);
        // experience missing on the resume side
        assert_eq!(scores[&Section::Experience].score, 0.0);
        assert_eq!(scores[&Section::Experience].weighted_score, 0.0);
        assert_eq!(scores[&Section::Experience].weight, 0.30);
    }

    #[test]
    fn test_years_match_tiers() {
        assert_eq!(years_match_score(0, 0), 100.0);
        assert_eq!(years_match_score(5, 3), 100.0);
        assert_eq!(years_match_score(7, 10), 80.0);
        assert_eq!(years_match_score(5, 10), 60.0);
        assert_eq!(years_match_score(4, 10), 40.0);
        assert_eq!(years_match_score(0, 2), 40.0);
    }

    #[test]
    fn test_experience_match_example() {
        let resume = extract_experience_level("5 years experience, Python developer");
        let jd = extract_experience_level("Looking for 3+ years experience with Python and AWS");
        let analysis = analyze_experience_match(resume, jd);
        assert_eq!(analysis.resume_experience.max_years, 5);
        assert_eq!(analysis.jd_requirements.max_years, 3);
        assert_eq!(analysis.years_match_score, 100.0);
    }

    #[test]
    fn test_level_match_partial() {
        let resume = extract_experience_level("senior engineer");
        let jd = extract_experience_level("senior engineer reporting to the director");
        assert!(jd.levels_detected.contains(&ExperienceLevel::Executive));
        let analysis = analyze_experience_match(resume, jd);
        assert_eq!(analysis.level_match_score, 50.0);
        assert_eq!(analysis.overall_experience_score, 75.0);
    }

    #[test]
    fn test_skill_match_no_requirements_is_full() {
        assert_eq!(skill_match_score(0, 0), 100.0);
        assert_eq!(skill_match_score(1, 4), 25.0);
    }

    #[test]
    fn test_final_score_adds_section_sum_unscaled_by_default() {
        let weights = ScoringWeights::default();
        let sections = score_map(&[(Section::Skills, 0.2), (Section::Experience, 0.1)]);
        let score = final_score(&weights, 40.0, 50.0, 60.0, &sections);
        // 100 × (0.25×0.4 + 0.35×0.5 + 0.25×0.6 + 0.3); the 0.15 outer weight is not applied
        assert!((score - 72.5).abs() < 1e-9, "score {score}");
    }

    #[test]
    fn test_final_score_scaled_sections_when_enabled() {
        let weights = ScoringWeights {
            scale_sections: true,
            ..Default::default()
        };
        let sections = score_map(&[(Section::Skills, 0.2), (Section::Experience, 0.1)]);
        let score = final_score(&weights, 40.0, 50.0, 60.0, &sections);
        // 100 × (0.1 + 0.175 + 0.15 + 0.3 × 0.15)
        assert!((score - 47.0).abs() < 1e-9, "score {score}");
    }

    #[test]
    fn test_final_score_is_clamped() {
        let weights = ScoringWeights::default();
        let sections = score_map(&[(Section::Skills, 0.35), (Section::Experience, 0.30)]);
        assert_eq!(final_score(&weights, 100.0, 100.0, 100.0, &sections), 100.0);
        assert_eq!(final_score(&weights, 0.0, 0.0, 0.0, &BTreeMap::new()), 0.0);
    }
}
