//! Headline normalization shared by similarity scoring and topic tagging.

use std::sync::LazyLock;

use batnews_core::strip_markup;
use regex::Regex;

/// Editorial markers that carry no information about the event itself.
const EDITORIAL_MARKERS: &[&str] = &[
    "단독",
    "속보",
    "종합",
    "긴급",
    "exclusive",
    "breaking",
    "update",
    "updated",
];

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]|\([^)]*\)|【[^】]*】|〔[^〕]*〕|［[^］]*］|<[^>]*>").expect("valid regex")
});

/// Normalize a headline for comparison.
///
/// Lower-cases, drops bracketed annotations and editorial markers, keeps only
/// letters, digits and whitespace, and collapses runs of whitespace. Two
/// headlines that differ only in punctuation or a `[단독]` prefix normalize to
/// the same string.
#[must_use]
pub fn normalize_title(raw: &str) -> String {
    let lowered = strip_markup(raw).to_lowercase();
    let unbracketed = BRACKETED.replace_all(&lowered, " ");

    let cleaned: String = unbracketed
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !EDITORIAL_MARKERS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized headline with all whitespace removed, the form n-grams are cut from.
#[must_use]
pub fn compact_title(raw: &str) -> String {
    normalize_title(raw).chars().filter(|c| !c.is_whitespace()).collect()
}
