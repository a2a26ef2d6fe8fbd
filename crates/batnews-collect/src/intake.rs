//! Provider-independent acceptance of raw entries into candidates.
//!
//! Collectors feed every parsed entry through an [`Intake`], which applies the
//! recency window, drops records it cannot use, enforces link uniqueness
//! across all queries of a run, and assigns the running fetch-order rank.

use std::collections::HashSet;

use batnews_core::{CandidateItem, Provider};
use chrono::{DateTime, Duration, FixedOffset};

use crate::normalize::{clean_text, domain_of, normalize_link, parse_pub_date};

/// Only items published at or after `now - hours` are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    pub now: DateTime<FixedOffset>,
    pub hours: u32,
}

impl RecencyWindow {
    #[must_use]
    pub fn cutoff(&self) -> DateTime<FixedOffset> {
        self.now - Duration::hours(i64::from(self.hours))
    }
}

/// One entry as parsed from a provider response, before any filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Publisher name when the provider reports one.
    pub source: Option<String>,
    pub published: String,
}

/// What happened to an offered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    Stale,
    Duplicate,
    Unusable,
    Full,
}

/// Result of collecting one provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    pub items: Vec<CandidateItem>,
    pub stale: usize,
    pub duplicates: usize,
    /// Entries dropped for an empty link or title, or an unparseable publish time.
    pub unusable: usize,
    pub failed_requests: usize,
}

pub struct Intake {
    provider: Provider,
    window: RecencyWindow,
    max_fetch: usize,
    fallback_source: &'static str,
    seen_links: HashSet<String>,
    report: CollectReport,
}

impl Intake {
    #[must_use]
    pub fn new(
        provider: Provider,
        window: RecencyWindow,
        max_fetch: usize,
        fallback_source: &'static str,
    ) -> Self {
        Self {
            provider,
            window,
            max_fetch,
            fallback_source,
            seen_links: HashSet::new(),
            report: CollectReport::default(),
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.report.items.len() >= self.max_fetch
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max_fetch.saturating_sub(self.report.items.len())
    }

    pub fn record_failure(&mut self) {
        self.report.failed_requests += 1;
    }

    /// Offer one entry. Accepted entries get the next rank.
    pub fn offer(&mut self, entry: RawEntry) -> Offer {
        if self.is_full() {
            return Offer::Full;
        }

        let title = clean_text(&entry.title);
        let link = normalize_link(&entry.link);
        let Some(published_at) = parse_pub_date(&entry.published) else {
            self.report.unusable += 1;
            return Offer::Unusable;
        };
        if title.is_empty() || link.is_empty() {
            self.report.unusable += 1;
            return Offer::Unusable;
        }
        if published_at < self.window.cutoff() {
            self.report.stale += 1;
            return Offer::Stale;
        }
        if !self.seen_links.insert(link.clone()) {
            self.report.duplicates += 1;
            return Offer::Duplicate;
        }

        let source = entry
            .source
            .map(|s| clean_text(&s))
            .filter(|s| !s.is_empty())
            .or_else(|| domain_of(&link))
            .unwrap_or_else(|| self.fallback_source.to_string());

        let rank = u32::try_from(self.report.items.len()).unwrap_or(u32::MAX);
        self.report.items.push(CandidateItem {
            title,
            description: clean_text(&entry.description),
            link,
            source,
            published_at,
            rank,
            provider: self.provider,
        });
        Offer::Accepted
    }

    #[must_use]
    pub fn finish(self) -> CollectReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batnews_core::reference_offset;
    use chrono::TimeZone;

    fn window() -> RecencyWindow {
        RecencyWindow {
            now: reference_offset()
                .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
                .unwrap(),
            hours: 24,
        }
    }

    fn entry(n: usize, hours_ago: i64) -> RawEntry {
        let published = window().now - Duration::hours(hours_ago);
        RawEntry {
            title: format!("배터리 뉴스 {n}"),
            description: "<b>요약</b>".to_string(),
            link: format!("https://news.example.com/{n}?utm_source=feed"),
            source: None,
            published: published.to_rfc2822(),
        }
    }

    #[test]
    fn stale_items_are_dropped_from_full_batch() {
        let mut intake = Intake::new(Provider::Naver, window(), 500, "NAVER");
        for n in 0..150 {
            let age = if n % 15 == 0 { 25 + i64::try_from(n % 3).unwrap() } else { 1 };
            intake.offer(entry(n, age));
        }
        let report = intake.finish();
        assert_eq!(report.stale, 10);
        assert_eq!(report.items.len(), 140);
    }

    #[test]
    fn ranks_are_sequential_over_accepted_items() {
        let mut intake = Intake::new(Provider::Google, window(), 10, "Google News");
        intake.offer(entry(0, 1));
        intake.offer(entry(1, 30));
        intake.offer(entry(2, 2));
        let report = intake.finish();
        let ranks: Vec<u32> = report.items.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![0, 1]);
    }

    #[test]
    fn duplicate_links_after_normalization_keep_first() {
        let mut intake = Intake::new(Provider::Naver, window(), 10, "NAVER");
        let first = entry(1, 1);
        let mut second = entry(1, 2);
        second.title = "다른 제목".into();
        second.link = "https://news.example.com/1?fbclid=zzz".into();
        assert_eq!(intake.offer(first), Offer::Accepted);
        assert_eq!(intake.offer(second), Offer::Duplicate);
        let report = intake.finish();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].title, "배터리 뉴스 1");
        assert_eq!(report.items[0].link, "https://news.example.com/1");
    }

    #[test]
    fn unparseable_date_and_empty_link_are_dropped() {
        let mut intake = Intake::new(Provider::Naver, window(), 10, "NAVER");
        let mut bad_date = entry(1, 1);
        bad_date.published = "어제".into();
        let mut no_link = entry(2, 1);
        no_link.link = "  ".into();
        assert_eq!(intake.offer(bad_date), Offer::Unusable);
        assert_eq!(intake.offer(no_link), Offer::Unusable);
        assert_eq!(intake.finish().unusable, 2);
    }

    #[test]
    fn max_fetch_bounds_accepted_items() {
        let mut intake = Intake::new(Provider::Naver, window(), 2, "NAVER");
        for n in 0..5 {
            intake.offer(entry(n, 1));
        }
        assert!(intake.is_full());
        assert_eq!(intake.remaining(), 0);
        assert_eq!(intake.offer(entry(9, 1)), Offer::Full);
        assert_eq!(intake.finish().items.len(), 2);
    }

    #[test]
    fn source_falls_back_to_domain() {
        let mut intake = Intake::new(Provider::Naver, window(), 10, "NAVER");
        intake.offer(entry(1, 1));
        let mut named = entry(2, 1);
        named.source = Some("전자신문".into());
        intake.offer(named);
        let report = intake.finish();
        assert_eq!(report.items[0].source, "news.example.com");
        assert_eq!(report.items[1].source, "전자신문");
        assert_eq!(report.items[0].description, "요약");
    }

    #[test]
    fn cutoff_is_window_hours_before_now() {
        let w = window();
        assert_eq!(w.now - w.cutoff(), Duration::hours(24));
    }
}
