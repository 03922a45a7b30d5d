//! Match Orchestrator: one resume against one job description.
//!
//! `Matcher` holds the read-only shared pieces (vocabulary, capabilities, settings)
//! and is carried in `AppState` behind an `Arc`. `run` is synchronous and CPU-bound;
//! async callers should move it onto a blocking thread.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::matching::embedding::{Embedder, HashEmbedder};
use crate::matching::error::MatchError;
use crate::matching::experience::{extract_education, extract_experience_level, EducationInfo};
use crate::matching::language::{LanguageAnalyzer, RuleBasedAnalyzer};
use crate::matching::scoring::{
    analyze_experience_match, calculate_section_scores, final_score, skill_match_score,
    ExperienceMatch, ScoringWeights, SectionScore,
};
use crate::matching::sections::{extract_sections, Section, SectionMap};
use crate::matching::similarity::compute_similarity;
use crate::matching::skills::{extract_skills, SkillExtractionResult, DEFAULT_FUZZY_THRESHOLD};
use crate::matching::suggestions::{
    calculate_keyword_density, generate_improvement_suggestions, CriticalSkillPolicy,
    KeywordDensity, Suggestion,
};
use crate::matching::text::round2;
use crate::matching::vocabulary::SkillVocabulary;

// ────────────────────────────────────────────────────────────────────────────
// Result aggregate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScores {
    pub semantic_similarity: f64,
    pub skill_match: f64,
    pub experience_match: f64,
    pub section_scores: BTreeMap<Section, SectionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationComparison {
    pub resume: EducationInfo,
    pub jd: EducationInfo,
}

/// Everything one matching pass produces. Built whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub overall_match_score: f64, // 0 – 100
    pub component_scores: ComponentScores,
    pub resume_skills: SkillExtractionResult,
    pub jd_skills: SkillExtractionResult,
    pub common_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub experience_analysis: ExperienceMatch,
    pub education_info: EducationComparison,
    pub keyword_density: BTreeMap<String, KeywordDensity>,
    pub improvement_suggestions: Vec<Suggestion>,
    pub resume_sections: SectionMap,
}

// ────────────────────────────────────────────────────────────────────────────
// Matcher
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub fuzzy_threshold: f64,
    pub weights: ScoringWeights,
    pub critical_skills: CriticalSkillPolicy,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            weights: ScoringWeights::default(),
            critical_skills: CriticalSkillPolicy::default(),
        }
    }
}

pub struct Matcher {
    vocabulary: Arc<SkillVocabulary>,
    embedder: Option<Arc<dyn Embedder>>,
    analyzer: Option<Arc<dyn LanguageAnalyzer>>,
    settings: MatchSettings,
}

impl Matcher {
    /// A matcher with no capabilities: TF-IDF similarity and word-token candidates only.
    pub fn new(vocabulary: Arc<SkillVocabulary>, settings: MatchSettings) -> Self {
        Self {
            vocabulary,
            embedder: None,
            analyzer: None,
            settings,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn LanguageAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn embedder(&self) -> Option<&dyn Embedder> {
        self.embedder.as_deref()
    }

    pub fn analyzer(&self) -> Option<&dyn LanguageAnalyzer> {
        self.analyzer.as_deref()
    }

    #[allow(dead_code)]
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Runs a full matching pass. Empty input is rejected before any scoring;
    /// a panic in any step is logged and reported as `Computation`.
    pub fn run(&self, resume_text: &str, jd_text: &str) -> Result<MatchResult, MatchError> {
        if resume_text.trim().is_empty() {
            return Err(MatchError::InputValidation("resume text is empty".to_string()));
        }
        if jd_text.trim().is_empty() {
            return Err(MatchError::InputValidation(
                "job description is empty".to_string(),
            ));
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| self.score(resume_text, jd_text)));

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    score = result.overall_match_score,
                    common = result.common_skills.len(),
                    missing = result.missing_skills.len(),
                    "Match complete"
                );
                Ok(result)
            }
            Ok(Err(e)) => {
                error!("Matching failed: {e}");
                Err(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Matching panicked: {message}");
                Err(MatchError::Computation(message))
            }
        }
    }

    fn score(&self, resume_text: &str, jd_text: &str) -> Result<MatchResult, MatchError> {
        let embedder = self.embedder();
        let analyzer = self.analyzer();
        let threshold = self.settings.fuzzy_threshold;

        let resume_sections = extract_sections(resume_text);
        let jd_sections = extract_sections(jd_text);

        let semantic = compute_similarity(resume_text, jd_text, embedder);

        let resume_skills = extract_skills(resume_text, &self.vocabulary, analyzer, threshold);
        let jd_skills = extract_skills(jd_text, &self.vocabulary, analyzer, threshold);
        let resume_all = resume_skills.all();
        let jd_all = jd_skills.all();
        let common_skills: BTreeSet<String> = resume_all.intersection(&jd_all).cloned().collect();
        let missing_skills: BTreeSet<String> = jd_all.difference(&resume_all).cloned().collect();
        let skill_match = skill_match_score(common_skills.len(), jd_all.len());

        let section_scores = calculate_section_scores(&resume_sections, &jd_sections, embedder);

        let experience_analysis = analyze_experience_match(
            extract_experience_level(resume_text),
            extract_experience_level(jd_text),
        );

        let education_info = EducationComparison {
            resume: extract_education(resume_text),
            jd: extract_education(jd_text),
        };

        let overall = final_score(
            &self.settings.weights,
            semantic,
            skill_match,
            experience_analysis.overall_experience_score,
            &section_scores,
        );
        debug!(
            semantic,
            skill_match,
            experience = experience_analysis.overall_experience_score,
            overall,
            "Component scores"
        );

        let improvement_suggestions = generate_improvement_suggestions(
            &resume_all,
            &jd_all,
            &experience_analysis,
            &self.settings.critical_skills,
        );
        let keyword_density = calculate_keyword_density(resume_text, &jd_all)?;

        Ok(MatchResult {
            overall_match_score: round2(overall),
            component_scores: ComponentScores {
                semantic_similarity: round2(semantic),
                skill_match: round2(skill_match),
                experience_match: round2(experience_analysis.overall_experience_score),
                section_scores,
            },
            resume_skills,
            jd_skills,
            common_skills,
            missing_skills,
            experience_analysis,
            education_info,
            keyword_density,
            improvement_suggestions,
            resume_sections,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure during matching".to_string()
    }
}

/// Convenience entry point: default settings with the built-in hash embedder
/// and rule-based analyzer.
#[allow(dead_code)]
pub fn match_resume(
    resume_text: &str,
    jd_text: &str,
    vocabulary: &SkillVocabulary,
) -> Result<MatchResult, MatchError> {
    Matcher::new(Arc::new(vocabulary.clone()), MatchSettings::default())
        .with_embedder(Arc::new(HashEmbedder::default()))
        .with_analyzer(Arc::new(RuleBasedAnalyzer))
        .run(resume_text, jd_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::error::CapabilityError;
    use crate::matching::suggestions::SuggestionKind;

    const RESUME: &str = "5 years experience, Python developer";
    const JD: &str = "Looking for 3+ years experience with Python and AWS";

    const FULL_RESUME: &str = "Summary\nSenior backend engineer with 7 years of experience building APIs.\n\
        Experience\nAcme Corp: Python, Django, PostgreSQL and Docker services for payments.\n\
        Education\nBSc Computer Science, State University.\n\
        Skills\nPython, Django, PostgreSQL, Docker, Git, leadership.";
    const FULL_JD: &str = "We are hiring a senior backend engineer with 5+ years of experience.\n\
        Skills required: Python, Django, Kubernetes, AWS and Terraform for infrastructure work.\n\
        Education: Bachelor degree in computer science or equivalent experience.";

    struct PanickingEmbedder;

    impl Embedder for PanickingEmbedder {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn dimension(&self) -> usize {
            8
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
            panic!("embedding backend crashed")
        }
    }

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(SkillVocabulary::builtin()), MatchSettings::default())
            .with_embedder(Arc::new(HashEmbedder::default()))
            .with_analyzer(Arc::new(RuleBasedAnalyzer))
    }

    #[test]
    fn test_basic_resume_against_jd() {
        let result = match_resume(RESUME, JD, &SkillVocabulary::builtin()).unwrap();

        assert_eq!(result.experience_analysis.resume_experience.max_years, 5);
        assert_eq!(result.experience_analysis.jd_requirements.max_years, 3);
        assert_eq!(result.experience_analysis.years_match_score, 100.0);
        assert!(result.resume_skills.exact_matches.contains("python"));
        assert!(result.missing_skills.contains("aws"));
        assert!(result.common_skills.contains("python"));
        assert!((0.0..=100.0).contains(&result.overall_match_score));
    }

    #[test]
    fn test_full_documents_produce_consistent_result() {
        let result = matcher().run(FULL_RESUME, FULL_JD).unwrap();

        assert!(result.common_skills.is_subset(&result.jd_skills.all()));
        assert!(result.missing_skills.is_disjoint(&result.resume_skills.all()));
        assert!(result.missing_skills.contains("kubernetes"));
        assert_eq!(result.component_scores.section_scores.len(), 5);
        for score in result.component_scores.section_scores.values() {
            assert!((0.0..=100.0).contains(&score.score));
        }
        assert!(result.keyword_density.len() <= 10);
        assert!(result.education_info.resume.institutions.contains("state university"));
        assert!(!result.resume_sections.skills.is_empty());
        assert!(result
            .improvement_suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::CriticalSkills));
    }

    #[test]
    fn test_run_is_idempotent() {
        let matcher = matcher();
        let first = matcher.run(FULL_RESUME, FULL_JD).unwrap();
        let second = matcher.run(FULL_RESUME, FULL_JD).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let matcher = matcher();
        assert!(matches!(
            matcher.run("  \n", JD),
            Err(MatchError::InputValidation(_))
        ));
        assert!(matches!(
            matcher.run(RESUME, ""),
            Err(MatchError::InputValidation(_))
        ));
    }

    #[test]
    fn test_no_jd_skills_gives_full_skill_score() {
        let result = matcher()
            .run(RESUME, "We are looking for a cheerful person to join our bakery team")
            .unwrap();
        assert!(result.jd_skills.all().is_empty());
        assert_eq!(result.component_scores.skill_match, 100.0);
    }

    #[test]
    fn test_panic_in_step_becomes_computation_error() {
        let matcher = Matcher::new(Arc::new(SkillVocabulary::builtin()), MatchSettings::default())
            .with_embedder(Arc::new(PanickingEmbedder));
        match matcher.run(RESUME, JD) {
            Err(MatchError::Computation(message)) => assert!(message.contains("crashed")),
            other => panic!("expected computation error, got {other:?}"),
        }
    }

    #[test]
    fn test_without_capabilities_still_scores() {
        let matcher = Matcher::new(Arc::new(SkillVocabulary::builtin()), MatchSettings::default());
        let result = matcher.run(FULL_RESUME, FULL_JD).unwrap();
        assert!(result.component_scores.semantic_similarity > 0.0);
        assert!(result.resume_skills.exact_matches.contains("django"));
    }

    #[test]
    fn test_section_sum_is_not_scaled_by_default() {
        let unscaled = matcher().run(FULL_RESUME, FULL_JD).unwrap();

        let settings = MatchSettings {
            weights: ScoringWeights {
                scale_sections: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let scaled = Matcher::new(Arc::new(SkillVocabulary::builtin()), settings)
            .with_embedder(Arc::new(HashEmbedder::default()))
            .with_analyzer(Arc::new(RuleBasedAnalyzer))
            .run(FULL_RESUME, FULL_JD)
            .unwrap();

        let section_sum: f64 = unscaled
            .component_scores
            .section_scores
            .values()
            .map(|s| s.weighted_score)
            .sum();
        assert!(section_sum > 0.0);
        assert!(unscaled.overall_match_score > scaled.overall_match_score);
    }

    #[test]
    fn test_result_serializes_with_section_keys() {
        let result = matcher().run(FULL_RESUME, FULL_JD).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["component_scores"]["section_scores"]["skills"]["weight"].is_number());
        assert!(json["resume_sections"]["skills"].is_string());
        assert!(json["education_info"]["jd"]["degrees"].is_array());
    }
}
