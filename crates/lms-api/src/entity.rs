//! Pieces shared by the course and simulation handlers.

use axum::http::HeaderMap;
use lms_core::{payload::ONLY_CHECK_SLUG_HEADER, slug::slugify};

use crate::error::ApiError;

/// Whether the request only asks if the title's slug is free.
pub fn only_check_slug(headers: &HeaderMap) -> bool {
    headers
        .get(ONLY_CHECK_SLUG_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Slug for `title`; a title with nothing sluggable in it is rejected.
pub fn derive_slug(title: &str, title_required: &str) -> Result<String, ApiError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(ApiError::Validation(title_required.to_string()));
    }
    Ok(slug)
}

/// Map a unique violation (a slug taken by a concurrent save) to 409.
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    let unique = err
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation());
    if unique {
        ApiError::Conflict(message.to_string())
    } else {
        ApiError::Database(err)
    }
}

/// URLs in `before` that no longer appear in `after`.
pub fn stale_urls<'a>(before: Vec<String>, after: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let after: Vec<&str> = after.into_iter().collect();
    let mut stale: Vec<String> = before
        .into_iter()
        .filter(|url| !after.contains(&url.as_str()))
        .collect();
    stale.sort();
    stale.dedup();
    stale
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_only_check_slug() {
        let mut headers = HeaderMap::new();
        assert!(!only_check_slug(&headers));
        headers.insert(ONLY_CHECK_SLUG_HEADER, HeaderValue::from_static("True"));
        assert!(only_check_slug(&headers));
        headers.insert(ONLY_CHECK_SLUG_HEADER, HeaderValue::from_static("false"));
        assert!(!only_check_slug(&headers));
    }

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Basic Life Support", "req").unwrap(), "basic-life-support");
        assert!(matches!(derive_slug("!!!", "req"), Err(ApiError::Validation(m)) if m == "req"));
    }

    #[test]
    fn test_stale_urls() {
        let before = vec!["a".to_string(), "b".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(stale_urls(before, ["c", "x"]), vec!["a", "b"]);
    }
}
