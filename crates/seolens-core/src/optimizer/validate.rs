//! Acceptance checks for rewritten HTML coming back from a content improver

use crate::improver::strip_code_fences;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// A candidate may grow to at most this multiple of the HTML it replaces
pub const MAX_GROWTH_FACTOR: usize = 2;

static STRUCTURAL_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(html|head|body|title|div|p|h1|h2)[\s>/]").expect("invalid tag regex")
});

/// Why a candidate was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CandidateRejection {
    #[error("candidate is empty")]
    Empty,

    #[error("candidate is {length} bytes, limit is {limit}")]
    TooLarge { length: usize, limit: usize },

    #[error("candidate contains no structural HTML tags")]
    NoMarkup,
}

/// Strip code fences and check the candidate against `original_length`.
/// Returns the cleaned candidate when it is acceptable.
pub fn validate_candidate(
    candidate: &str,
    original_length: usize,
) -> Result<String, CandidateRejection> {
    let cleaned = strip_code_fences(candidate);
    if cleaned.is_empty() {
        return Err(CandidateRejection::Empty);
    }

    let limit = original_length.saturating_mul(MAX_GROWTH_FACTOR);
    if cleaned.len() > limit {
        return Err(CandidateRejection::TooLarge {
            length: cleaned.len(),
            limit,
        });
    }

    if !STRUCTURAL_TAG.is_match(&cleaned) {
        return Err(CandidateRejection::NoMarkup);
    }

    Ok(cleaned)
}
