use std::sync::LazyLock;

use regex::Regex;

static STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub const UNKNOWN: &str = "unknown";

/// Turn display text into the namespace-safe id shared by the crawl and
/// convert stages. Empty input maps to `"unknown"`.
pub fn slugify(text: &str) -> String {
    if text.is_empty() {
        return UNKNOWN.to_string();
    }
    let stripped = STRIP_RE.replace_all(text, "");
    let joined = SPACE_RE.replace_all(&stripped, "_");
    let slug = joined.to_lowercase();
    if slug.is_empty() {
        UNKNOWN.to_string()
    } else {
        slug
    }
}

/// First `max` characters of `text`. Counts chars, not bytes, and never
/// looks for a word boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
