//! Server-rendered HTML for the upload form and the match report.

use crate::matching::matcher::MatchResult;
use crate::matching::suggestions::Priority;

/// Lists in the report show at most this many entries.
pub const MAX_LIST_ITEMS: usize = 5;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:860px;margin:2rem auto;padding:0 1rem;color:#222}\
h1{font-size:1.6rem}table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
.alert{background:#fdecea;border:1px solid #f5c2c0;padding:.6rem;border-radius:4px}\
.score{font-size:2.4rem;font-weight:700}.high{color:#b3261e}.medium{color:#8a6d00}\
textarea{width:100%;min-height:12rem}";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_percentage(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        "0.0%".to_string()
    }
}

/// First `MAX_LIST_ITEMS` entries, escaped, comma-separated; "None" when empty.
pub fn format_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let shown: Vec<String> = items
        .into_iter()
        .take(MAX_LIST_ITEMS)
        .map(|item| escape_html(item))
        .collect();
    if shown.is_empty() {
        "None".to_string()
    } else {
        shown.join(", ")
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape_html(title)
    )
}

/// Upload form, optionally with an error banner above it.
pub fn render_index(error: Option<&str>) -> String {
    let alert = error
        .map(|msg| format!("<p class=\"alert\">{}</p>", escape_html(msg)))
        .unwrap_or_default();

    let body = format!(
        "<h1>Resume Matcher</h1>{alert}\
         <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\
         <p><label for=\"resume\">Resume (PDF, DOCX or TXT)</label><br>\
         <input type=\"file\" id=\"resume\" name=\"resume\" accept=\".pdf,.docx,.txt\" required></p>\
         <p><label for=\"job_description\">Job description</label><br>\
         <textarea id=\"job_description\" name=\"job_description\" required></textarea></p>\
         <p><button type=\"submit\">Analyze</button></p></form>"
    );
    page("Resume Matcher", &body)
}

pub fn render_result_page(result: &MatchResult) -> String {
    let scores = &result.component_scores;
    let mut body = String::new();

    body.push_str("<h1>Match Report</h1>");
    body.push_str(&format!(
        "<p class=\"score\">{}</p>",
        format_percentage(result.overall_match_score)
    ));

    body.push_str("<h2>Component scores</h2><table>");
    for (label, value) in [
        ("Semantic similarity", scores.semantic_similarity),
        ("Skill match", scores.skill_match),
        ("Experience match", scores.experience_match),
    ] {
        body.push_str(&format!(
            "<tr><th>{label}</th><td>{}</td></tr>",
            format_percentage(value)
        ));
    }
    for (section, score) in &scores.section_scores {
        body.push_str(&format!(
            "<tr><th>Section: {}</th><td>{} (weight {:.2})</td></tr>",
            section.as_str(),
            format_percentage(score.score),
            score.weight
        ));
    }
    body.push_str("</table>");

    body.push_str("<h2>Skills</h2><table>");
    body.push_str(&format!(
        "<tr><th>Matching</th><td>{}</td></tr>",
        format_list(&result.common_skills)
    ));
    body.push_str(&format!(
        "<tr><th>Missing</th><td>{}</td></tr>",
        format_list(&result.missing_skills)
    ));
    body.push_str(&format!(
        "<tr><th>Found in resume</th><td>{}</td></tr>",
        format_list(&result.resume_skills.all())
    ));
    body.push_str("</table>");

    let experience = &result.experience_analysis;
    body.push_str(&format!(
        "<h2>Experience</h2><p>Resume: {} years (max) &middot; Required: {} years &middot; \
         Years match {} &middot; Level match {}</p>",
        experience.resume_experience.max_years,
        experience.jd_requirements.max_years,
        format_percentage(experience.years_match_score),
        format_percentage(experience.level_match_score),
    ));

    if !result.improvement_suggestions.is_empty() {
        body.push_str("<h2>Suggestions</h2><ul>");
        for suggestion in &result.improvement_suggestions {
            let class = match suggestion.priority {
                Priority::High => "high",
                Priority::Medium => "medium",
            };
            body.push_str(&format!(
                "<li class=\"{class}\"><strong>{}</strong>: {}</li>",
                escape_html(&suggestion.title),
                escape_html(&suggestion.description)
            ));
        }
        body.push_str("</ul>");
    }

    if !result.keyword_density.is_empty() {
        body.push_str("<h2>Keyword density</h2><table>");
        for (keyword, density) in &result.keyword_density {
            body.push_str(&format!(
                "<tr><th>{}</th><td>{} occurrences</td><td>{}</td></tr>",
                escape_html(keyword),
                density.count,
                format_percentage(density.density)
            ));
        }
        body.push_str("</table>");
    }

    body.push_str("<p><a href=\"/\">Analyze another resume</a></p>");
    page("Match Report", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matcher::match_resume;
    use crate::matching::vocabulary::SkillVocabulary;
    use std::collections::BTreeSet;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(72.456), "72.5%");
        assert_eq!(format_percentage(0.0), "0.0%");
        assert_eq!(format_percentage(f64::NAN), "0.0%");
    }

    #[test]
    fn test_format_list_truncates() {
        let items: BTreeSet<String> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(format_list(&items), "a, b, c, d, e");
        assert_eq!(format_list(&BTreeSet::new()), "None");
    }

    #[test]
    fn test_index_shows_escaped_error() {
        let html = render_index(Some("File <too> large"));
        assert!(html.contains("File &lt;too&gt; large"));
        assert!(html.contains("name=\"job_description\""));
        assert!(!render_index(None).contains("class=\"alert\""));
    }

    #[test]
    fn test_result_page_contains_scores_and_skills() {
        let result = match_resume(
            "5 years experience, Python developer",
            "Looking for 3+ years experience with Python and AWS",
            &SkillVocabulary::builtin(),
        )
        .unwrap();
        let html = render_result_page(&result);
        assert!(html.contains(&format_percentage(result.overall_match_score)));
        assert!(html.contains("python"));
        assert!(html.contains("aws"));
        assert!(html.contains("Section: skills"));
    }
}
