//! Skill Vocabulary: the fixed catalog of canonical skills, grouped by category,
//! plus the synonym table used for alias backfill.
//!
//! Built once at startup and shared read-only behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet};

const TECHNICAL_SKILLS: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "python", "java", "javascript", "typescript", "c++", "c#", "php", "ruby", "go",
            "rust", "swift", "kotlin", "scala", "matlab", "perl", "shell", "bash",
            "powershell", "sql", "plsql", "nosql", "html", "css", "sass", "scss", "less",
        ],
    ),
    (
        "web_frameworks",
        &[
            "react", "angular", "vue", "svelte", "next.js", "nuxt.js", "gatsby", "django",
            "flask", "fastapi", "express", "node.js", "spring", "spring boot", "laravel",
            "symfony", "rails", "asp.net", "blazor",
        ],
    ),
    (
        "databases",
        &[
            "mysql", "postgresql", "sqlite", "mongodb", "redis", "elasticsearch",
            "cassandra", "dynamodb", "oracle", "sql server", "mariadb", "neo4j", "influxdb",
            "couchdb", "firebase",
        ],
    ),
    (
        "cloud_platforms",
        &[
            "aws", "azure", "gcp", "google cloud", "heroku", "vercel", "netlify",
            "digitalocean", "linode", "ibm cloud", "oracle cloud",
        ],
    ),
    (
        "devops_tools",
        &[
            "docker", "kubernetes", "jenkins", "gitlab ci", "github actions", "terraform",
            "ansible", "puppet", "chef", "vagrant", "nginx", "apache", "prometheus",
            "grafana", "elk stack", "splunk",
        ],
    ),
    (
        "ml_ai",
        &[
            "machine learning", "deep learning", "neural networks", "tensorflow", "pytorch",
            "keras", "scikit-learn", "pandas", "numpy", "opencv", "nlp", "computer vision",
            "reinforcement learning", "transformers", "bert", "gpt", "langchain",
            "hugging face",
        ],
    ),
    (
        "data_science",
        &[
            "data analysis", "data visualization", "statistics", "tableau", "power bi",
            "jupyter", "spark", "hadoop", "kafka", "airflow", "dbt", "snowflake",
            "databricks",
        ],
    ),
    (
        "mobile_development",
        &[
            "ios", "android", "react native", "flutter", "xamarin", "ionic", "swift",
            "objective-c", "kotlin", "java",
        ],
    ),
    (
        "testing",
        &[
            "unit testing", "integration testing", "selenium", "cypress", "jest", "pytest",
            "junit", "testng", "postman", "api testing",
        ],
    ),
    (
        "version_control",
        &["git", "github", "gitlab", "bitbucket", "svn", "mercurial"],
    ),
];

const SOFT_SKILLS: &[&str] = &[
    "leadership", "communication", "teamwork", "problem solving", "analytical thinking",
    "creativity", "adaptability", "time management", "project management",
    "critical thinking", "collaboration", "presentation skills", "mentoring", "coaching",
    "negotiation", "customer service", "attention to detail", "multitasking",
    "decision making", "strategic thinking", "innovation", "emotional intelligence",
    "conflict resolution",
];

const CERTIFICATIONS: &[&str] = &[
    "aws certified", "azure certified", "google cloud certified", "pmp", "scrum master",
    "product owner", "cissp", "cisa", "ceh", "comptia", "cisco certified",
    "oracle certified", "microsoft certified", "salesforce certified",
    "kubernetes certified",
];

const SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "node.js", "nodejs"]),
    ("python", &["py"]),
    ("machine learning", &["ml", "artificial intelligence", "ai"]),
    ("deep learning", &["dl", "neural networks", "nn"]),
    ("natural language processing", &["nlp"]),
    ("computer vision", &["cv", "image processing"]),
    ("user interface", &["ui"]),
    ("user experience", &["ux"]),
    ("application programming interface", &["api"]),
    ("structured query language", &["sql"]),
    ("cascading style sheets", &["css"]),
    ("hypertext markup language", &["html"]),
    ("amazon web services", &["aws"]),
    ("google cloud platform", &["gcp", "google cloud"]),
    ("microsoft azure", &["azure"]),
    ("continuous integration", &["ci"]),
    ("continuous deployment", &["cd"]),
    ("test driven development", &["tdd"]),
    ("object oriented programming", &["oop"]),
    ("representational state transfer", &["rest", "restful"]),
    ("graphql", &["graph ql"]),
    ("kubernetes", &["k8s"]),
    ("elasticsearch", &["elastic search"]),
];

/// Immutable skill catalog.
///
/// Every collection is ordered so that iteration (and therefore fuzzy
/// tie-breaking) is identical across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVocabulary {
    categories: BTreeMap<String, BTreeSet<String>>,
    synonyms: BTreeMap<String, BTreeSet<String>>,
    all: BTreeSet<String>,
}

impl SkillVocabulary {
    /// Builds a vocabulary from arbitrary tables. Terms are lower-cased and trimmed;
    /// empty terms and categories left empty after that are dropped.
    pub fn new(
        categories: BTreeMap<String, BTreeSet<String>>,
        synonyms: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        let categories: BTreeMap<String, BTreeSet<String>> = categories
            .into_iter()
            .map(|(name, skills)| (name, normalize_terms(skills)))
            .filter(|(_, skills)| !skills.is_empty())
            .collect();

        let synonyms: BTreeMap<String, BTreeSet<String>> = synonyms
            .into_iter()
            .map(|(canonical, aliases)| (canonical.trim().to_lowercase(), normalize_terms(aliases)))
            .filter(|(canonical, aliases)| !canonical.is_empty() && !aliases.is_empty())
            .collect();

        let all = categories.values().flatten().cloned().collect();

        Self {
            categories,
            synonyms,
            all,
        }
    }

    /// The built-in catalog: technical categories, soft skills, and certifications.
    pub fn builtin() -> Self {
        let mut categories: BTreeMap<String, BTreeSet<String>> = TECHNICAL_SKILLS
            .iter()
            .map(|(name, skills)| (name.to_string(), to_set(skills)))
            .collect();
        categories.insert("soft_skills".to_string(), to_set(SOFT_SKILLS));
        categories.insert("certifications".to_string(), to_set(CERTIFICATIONS));

        let synonyms = SYNONYMS
            .iter()
            .map(|(canonical, aliases)| (canonical.to_string(), to_set(aliases)))
            .collect();

        Self::new(categories, synonyms)
    }

    /// Deduplicated union of every category.
    pub fn all_skills(&self) -> &BTreeSet<String> {
        &self.all
    }

    pub fn skills_by_category(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.categories
    }

    /// Canonical skill → aliases. Canonical keys need not appear in any category.
    pub fn synonyms(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.synonyms
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_set(terms: &[&str]) -> BTreeSet<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn normalize_terms(terms: BTreeSet<String>) -> BTreeSet<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
