//! Course and simulation keyword rules.
//!
//! Keywords are stored trimmed and lower-cased; each must be a single word
//! and unique within its entity.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword is empty")]
    Empty,
    #[error("keyword must be a single word")]
    ContainsSpace,
    #[error("keyword already added")]
    Duplicate,
}

pub fn normalize(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Validate `candidate` against `existing`, ignoring the entry at `skip`
/// (the one being edited).
///
/// Returns the normalized keyword on success.
pub fn validate(existing: &[String], candidate: &str, skip: Option<usize>) -> Result<String, KeywordError> {
    let normalized = normalize(candidate);

    if normalized.is_empty() {
        return Err(KeywordError::Empty);
    }
    if normalized.chars().any(char::is_whitespace) {
        return Err(KeywordError::ContainsSpace);
    }

    let duplicate = existing
        .iter()
        .enumerate()
        .any(|(i, k)| Some(i) != skip && normalize(k) == normalized);
    if duplicate {
        return Err(KeywordError::Duplicate);
    }

    Ok(normalized)
}

/// Normalize a submitted keyword list, dropping empties and duplicates while
/// keeping first-seen order.
pub fn sanitize_list(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let normalized = normalize(keyword);
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}
