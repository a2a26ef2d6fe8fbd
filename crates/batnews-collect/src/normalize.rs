//! Field normalization shared by every provider.

use batnews_core::{reference_offset, strip_markup};
use chrono::{DateTime, FixedOffset};
use reqwest::Url;

/// Query keys dropped from links in addition to anything starting with `utm_`.
const TRACKING_KEYS: &[&str] = &["fbclid", "gclid", "mc_cid", "mc_eid"];

/// Publisher suffixes outside this length range are treated as part of the title.
const PUBLISHER_TAIL_CHARS: std::ops::RangeInclusive<usize> = 2..=60;

fn is_tracking_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_KEYS.contains(&key.as_str())
}

/// Canonical form of a link: tracking parameters and fragment removed.
///
/// Unparseable input is returned trimmed but otherwise untouched, so the
/// function is idempotent for every input.
#[must_use]
pub fn normalize_link(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);

    if url.query_pairs().any(|(k, _)| is_tracking_key(&k)) {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !is_tracking_key(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url.to_string()
}

/// Host of a link without a leading `www.`.
#[must_use]
pub fn domain_of(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

/// Split a trailing `" - Publisher"` off a headline.
///
/// Returns the headline unchanged and `None` when there is no plausible
/// publisher suffix.
#[must_use]
pub fn split_publisher_tail(title: &str) -> (String, Option<String>) {
    let trimmed = title.trim();
    if let Some((head, tail)) = trimmed.rsplit_once(" - ") {
        let head = head.trim();
        let tail = tail.trim();
        if !head.is_empty() && PUBLISHER_TAIL_CHARS.contains(&tail.chars().count()) {
            return (head.to_string(), Some(tail.to_string()));
        }
    }
    (trimmed.to_string(), None)
}

/// Parse an RFC 2822 or RFC 3339 timestamp into the reference timezone.
#[must_use]
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&reference_offset()))
}

/// Strip HTML tags, decode common entities, and collapse whitespace.
#[must_use]
pub fn clean_text(html: &str) -> String {
    strip_markup(html).split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
