use thiserror::Error;

/// Failure of an optional external capability (embedding model, language analysis).
/// Always recovered inside the core via a fallback path; never returned to callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    #[error("{0} capability is unavailable")]
    Unavailable(&'static str),

    #[error("{capability} failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },
}

/// The only error `Matcher::run` returns. A run either yields a complete
/// `MatchResult` or one of these; never a partial result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Matching failed: {0}")]
    Computation(String),
}
