//! Combining per-provider selections into the final digest.

use batnews_collect::domain_of;
use batnews_core::{Provider, SourcesFile};
use batnews_rank::{
    DiversityFilter, PreparedTitle, SelectedItem, SelectionParams, MAX_RELATED_LINKS,
};

/// One provider's ranked picks and how many it is expected to contribute.
#[derive(Debug, Clone)]
pub(crate) struct ProviderPicks {
    pub provider: Provider,
    pub quota: usize,
    pub ranked: Vec<SelectedItem>,
}

/// A selected item with its source tier and blended score.
#[derive(Debug, Clone)]
pub(crate) struct DigestItem {
    pub item: SelectedItem,
    pub tier: u8,
    pub score: f64,
}

/// `0.7 × relevance + 0.3 × importance`.
#[must_use]
pub(crate) fn blended_score(relevance: u8, importance: u8) -> f64 {
    0.7 * f64::from(relevance) + 0.3 * f64::from(importance)
}

/// Combine two providers' picks into one deduplicated, diversity-capped list.
///
/// Each provider's quota is offered first (`a` before `b`). A provider left
/// short after that is topped up from its own later picks, then from the
/// other provider's picks beyond what it already offered. An item whose
/// headline matches an accepted one at `dedupe_threshold` is dropped and its
/// link kept as a related link of the accepted item. Every other item must
/// pass one shared [`DiversityFilter`], so entity and topic caps hold across
/// providers.
pub(crate) fn merge_providers(
    a: &ProviderPicks,
    b: &ProviderPicks,
    dedupe_threshold: f64,
    params: &SelectionParams,
) -> Vec<SelectedItem> {
    let mut merger = Merger {
        threshold: dedupe_threshold,
        filter: DiversityFilter::new(params),
        kept: Vec::new(),
        duplicates: 0,
        capped: 0,
    };

    let mut a_next = a.ranked.len().min(a.quota);
    let mut b_next = b.ranked.len().min(b.quota);
    for item in a.ranked[..a_next].iter().chain(&b.ranked[..b_next]) {
        merger.offer(item);
    }

    let shortfall = merger.shortfall(a);
    merger.top_up(shortfall, a, &mut a_next);
    let shortfall = merger.shortfall(b);
    merger.top_up(shortfall, b, &mut b_next);

    for (short, donor, next) in [(a, b, &mut b_next), (b, a, &mut a_next)] {
        let shortfall = merger.shortfall(short);
        if shortfall == 0 {
            continue;
        }
        let filled = merger.top_up(shortfall, donor, next);
        if filled > 0 {
            tracing::info!(
                short = %short.provider,
                donor = %donor.provider,
                shortfall,
                backfilled = filled,
                "backfilling provider shortfall"
            );
        }
    }

    if merger.duplicates > 0 || merger.capped > 0 {
        tracing::info!(
            duplicates = merger.duplicates,
            capped = merger.capped,
            "dropped items while merging providers"
        );
    }
    merger.kept.into_iter().map(|(item, _)| item).collect()
}

struct Merger {
    threshold: f64,
    filter: DiversityFilter,
    kept: Vec<(SelectedItem, PreparedTitle)>,
    duplicates: usize,
    capped: usize,
}

impl Merger {
    /// Returns true when `item` was added to the list.
    fn offer(&mut self, item: &SelectedItem) -> bool {
        let title = PreparedTitle::new(&item.candidate.title);
        let duplicate_of = self
            .kept
            .iter()
            .position(|(_, kept)| kept.similarity(&title) >= self.threshold);
        if let Some(pos) = duplicate_of {
            absorb_link(&mut self.kept[pos].0, &item.candidate.link);
            self.duplicates += 1;
            return false;
        }
        if !self.filter.admit(item) {
            self.capped += 1;
            return false;
        }
        self.kept.push((item.clone(), title));
        true
    }

    /// Offer `donor`'s picks from `*next` on until `shortfall` are accepted.
    fn top_up(&mut self, shortfall: usize, donor: &ProviderPicks, next: &mut usize) -> usize {
        let mut filled = 0;
        while filled < shortfall && *next < donor.ranked.len() {
            if self.offer(&donor.ranked[*next]) {
                filled += 1;
            }
            *next += 1;
        }
        filled
    }

    fn shortfall(&self, picks: &ProviderPicks) -> usize {
        let have = self
            .kept
            .iter()
            .filter(|(item, _)| item.candidate.provider == picks.provider)
            .count();
        picks.quota.saturating_sub(have)
    }
}

fn absorb_link(into: &mut SelectedItem, link: &str) {
    if into.related_links.len() < MAX_RELATED_LINKS
        && into.candidate.link != link
        && !into.related_links.iter().any(|l| l == link)
    {
        into.related_links.push(link.to_string());
    }
}

/// Attach tiers and scores, sort by tier then score, and cut to `max_items`.
pub(crate) fn finalize(
    items: Vec<SelectedItem>,
    sources: &SourcesFile,
    min_items: usize,
    max_items: usize,
) -> Vec<DigestItem> {
    let mut digest: Vec<DigestItem> = items
        .into_iter()
        .map(|item| {
            let host = domain_of(&item.candidate.link).unwrap_or_default();
            let tier = sources.tier_for(&host, &item.candidate.source);
            let score = blended_score(item.relevance, item.importance);
            DigestItem { item, tier, score }
        })
        .collect();

    digest.sort_by(|a, b| a.tier.cmp(&b.tier).then(b.score.total_cmp(&a.score)));
    digest.truncate(max_items);

    if digest.len() < min_items {
        tracing::warn!(
            count = digest.len(),
            min_items,
            "fewer items than requested minimum"
        );
    }
    digest
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
