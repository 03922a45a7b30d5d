//! Section Segmenter: heuristic split of a document into named regions.
//!
//! Each section runs from the first match of its heading pattern to the earliest
//! match of any other heading found at least `NEXT_HEADING_OFFSET` characters after it,
//! or to the end of the text. Sections may overlap or be mis-bounded when headings
//! are missing, reordered, or closer together than the offset.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::text::advance_chars;

const NEXT_HEADING_OFFSET: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Contact => "contact",
            Section::Summary => "summary",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
        }
    }
}

/// Heading patterns in scan order. `Contact` has no heading and is never populated.
static HEADING_PATTERNS: Lazy<Vec<(Section, Regex)>> = Lazy::new(|| {
    [
        (
            Section::Experience,
            r"(?i)(experience|work experience|employment|career|professional experience)",
        ),
        (
            Section::Education,
            r"(?i)(education|academic|degree|university|college|school)",
        ),
        (
            Section::Skills,
            r"(?i)(skills|technical skills|competencies|expertise|technologies)",
        ),
        (
            Section::Projects,
            r"(?i)(projects|personal projects|work projects)",
        ),
        (
            Section::Certifications,
            r"(?i)(certifications|certificates|licenses)",
        ),
        (Section::Summary, r"(?i)(summary|objective|profile|about)"),
    ]
    .into_iter()
    .map(|(section, pattern)| (section, Regex::new(pattern).expect("valid heading pattern")))
    .collect()
});

/// Every section is either empty or a trimmed, contiguous slice of the source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMap {
    pub contact: String,
    pub summary: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub projects: String,
    pub certifications: String,
}

impl SectionMap {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Contact => &self.contact,
            Section::Summary => &self.summary,
            Section::Experience => &self.experience,
            Section::Education => &self.education,
            Section::Skills => &self.skills,
            Section::Projects => &self.projects,
            Section::Certifications => &self.certifications,
        }
    }

    fn slot_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Contact => &mut self.contact,
            Section::Summary => &mut self.summary,
            Section::Experience => &mut self.experience,
            Section::Education => &mut self.education,
            Section::Skills => &mut self.skills,
            Section::Projects => &mut self.projects,
            Section::Certifications => &mut self.certifications,
        }
    }
}

pub fn extract_sections(text: &str) -> SectionMap {
    let mut sections = SectionMap::default();

    for (section, pattern) in HEADING_PATTERNS.iter() {
        let Some(heading) = pattern.find(text) else {
            continue;
        };
        let start = heading.start();
        let search_from = advance_chars(text, start, NEXT_HEADING_OFFSET);

        let end = HEADING_PATTERNS
            .iter()
            .filter(|(other, _)| other != section)
            .filter_map(|(_, other_pattern)| other_pattern.find(&text[search_from..]))
            .map(|m| search_from + m.start())
            .min()
            .unwrap_or(text.len());

        *sections.slot_mut(*section) = text[start..end].trim().to_string();
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\n\
        Summary\nBackend engineer focused on reliable distributed services and APIs.\n\
        Work Experience\nAcme Corp, 2019-2024: built payment pipelines in Rust and Go, on-call lead.\n\
        Education\nBSc Computer Science, State University, graduated with honours in 2018.\n\
        Skills\nRust, Go, PostgreSQL, Kubernetes, Terraform, Prometheus and Grafana dashboards.\n\
        Projects\nOpen-source rate limiter crate with thousands of downloads per month.\n\
        Certifications\nCKA (Certified Kubernetes Administrator), AWS Solutions Architect.";

    fn is_slice_of(part: &str, whole: &str) -> bool {
        part.is_empty() || whole.contains(part)
    }

    #[test]
    fn test_well_formed_resume_sections() {
        let sections = extract_sections(RESUME);
        assert!(sections.summary.starts_with("Summary"));
        assert!(sections.experience.starts_with("Work Experience"));
        assert!(sections.experience.contains("payment pipelines"));
        assert!(!sections.experience.contains("BSc Computer Science"));
        assert!(sections.education.starts_with("Education"));
        assert!(sections.skills.starts_with("Skills"));
        assert!(sections.skills.contains("Kubernetes"));
        assert!(sections.projects.starts_with("Projects"));
        assert!(sections.certifications.starts_with("Certifications"));
        assert!(sections.contact.is_empty());
    }

    #[test]
    fn test_sections_are_contiguous_slices() {
        let sections = extract_sections(RESUME);
        for section in [
            Section::Contact,
            Section::Summary,
            Section::Experience,
            Section::Education,
            Section::Skills,
            Section::Projects,
            Section::Certifications,
        ] {
            assert!(is_slice_of(sections.get(section), RESUME), "{section:?} is not a slice");
        }
    }

    #[test]
    fn test_missing_heading_leaves_section_empty() {
        let sections = extract_sections("Rust, Go and Python developer");
        assert!(sections.projects.is_empty());
        assert!(sections.certifications.is_empty());
    }

    #[test]
    fn test_last_section_runs_to_end_of_text() {
        let text = "Skills: rust";
        let sections = extract_sections(text);
        assert_eq!(sections.skills, "Skills: rust");
    }

    #[test]
    fn test_headings_closer_than_offset_overlap() {
        // "Education" sits inside the first 50 characters after "Skills", so the skills
        // section swallows it.
        let text = "Skills: Rust. Education: BSc. Projects: a long description of work done here.";
        let sections = extract_sections(text);
        assert!(sections.skills.contains("Education"));
        assert!(sections.education.starts_with("Education"));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "Expérience — développeur senior ✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓✓ Skills: Rust et Go";
        let sections = extract_sections(text);
        assert!(sections.skills.starts_with("Skills"));
    }

    #[test]
    fn test_heading_offset_counts_characters_not_bytes() {
        // "Education" is 33 characters (58 bytes) past "Skills"
        let text = format!("Skills {} Education BSc", "é".repeat(25));
        let sections = extract_sections(&text);
        assert!(sections.skills.contains("Education"));
        assert!(sections.skills.ends_with("BSc"));
        assert_eq!(sections.education, "Education BSc");
    }

    #[test]
    fn test_next_heading_found_past_character_offset() {
        let text = format!("Skills {} Education BSc", "é".repeat(60));
        let sections = extract_sections(&text);
        assert!(!sections.skills.contains("Education"));
        assert!(sections.skills.ends_with('é'));
    }

    #[test]
    fn test_section_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Section::Certifications).unwrap(), "\"certifications\"");
        assert_eq!(Section::Skills.as_str(), "skills");
    }
}
