use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NOT_SLUG_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\d_-]+").unwrap());
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive a URL slug from a title.
///
/// Letters of any script are kept (Cyrillic titles produce Cyrillic slugs),
/// whitespace becomes `-`, everything else outside letters, digits, `-` and
/// `_` is dropped, and dash runs collapse to one dash with none at the ends.
pub fn slugify(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let dashed = WHITESPACE.replace_all(&lower, "-");
    let cleaned = NOT_SLUG_CHAR.replace_all(&dashed, "");
    let collapsed = DASH_RUN.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}
