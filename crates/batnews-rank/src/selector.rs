//! Ranker / selector: order event groups, enforce diversity, truncate to top-K.

use std::cmp::Reverse;
use std::collections::HashMap;

use batnews_core::CandidateItem;

use crate::extract::{extract_entities, extract_topic};
use crate::grouping::EventGroup;
use crate::similarity::PreparedTitle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    pub top_k: usize,
    /// Groups below this relevance are only used to backfill.
    pub relevance_floor: u8,
    /// Titles at or above this similarity to an already selected title are skipped.
    pub near_duplicate_threshold: f64,
    pub entity_cap: usize,
    pub topic_cap: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub candidate: CandidateItem,
    pub relevance: u8,
    pub importance: u8,
    pub entities: Vec<String>,
    pub topic: Option<&'static str>,
    /// Number of candidates in the event group this item represents.
    pub group_size: usize,
    /// Accepted from below the relevance floor.
    pub backfilled: bool,
    /// Other outlets' links for the same event, at most [`MAX_RELATED_LINKS`].
    pub related_links: Vec<String>,
}

/// Final ordered selection, never longer than the requested top-K.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSelection {
    pub items: Vec<SelectedItem>,
}

impl RankedSelection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Why groups were passed over, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub below_floor: usize,
    pub near_duplicate: usize,
    pub entity_capped: usize,
    pub topic_capped: usize,
    pub backfilled: usize,
}

/// Upper bound on [`SelectedItem::related_links`].
pub const MAX_RELATED_LINKS: usize = 2;

struct Pick {
    title: PreparedTitle,
    entities: Vec<String>,
    topic: Option<&'static str>,
}

enum Gate {
    Accept,
    NearDuplicate,
    EntityCapped,
    TopicCapped,
}

/// Running near-duplicate, per-entity and per-topic limits.
///
/// Every accepted item counts against the limits of later ones, so feeding
/// items in priority order keeps the best of each entity and topic.
#[derive(Debug, Clone)]
pub struct DiversityFilter {
    near_duplicate_threshold: f64,
    entity_cap: usize,
    topic_cap: usize,
    titles: Vec<PreparedTitle>,
    entity_counts: HashMap<String, usize>,
    topic_counts: HashMap<&'static str, usize>,
}

impl DiversityFilter {
    #[must_use]
    pub fn new(params: &SelectionParams) -> Self {
        Self {
            near_duplicate_threshold: params.near_duplicate_threshold,
            entity_cap: params.entity_cap,
            topic_cap: params.topic_cap,
            titles: Vec::new(),
            entity_counts: HashMap::new(),
            topic_counts: HashMap::new(),
        }
    }

    /// Accept `item` if it fits every limit, counting it when it does.
    pub fn admit(&mut self, item: &SelectedItem) -> bool {
        let pick = Pick {
            title: PreparedTitle::new(&item.candidate.title),
            entities: item.entities.clone(),
            topic: item.topic,
        };
        match self.check(&pick) {
            Gate::Accept => {
                self.record(&pick);
                true
            }
            _ => false,
        }
    }

    fn check(&self, pick: &Pick) -> Gate {
        if self
            .titles
            .iter()
            .any(|t| t.similarity(&pick.title) >= self.near_duplicate_threshold)
        {
            return Gate::NearDuplicate;
        }
        if pick
            .entities
            .iter()
            .any(|e| self.entity_counts.get(e).copied().unwrap_or(0) >= self.entity_cap)
        {
            return Gate::EntityCapped;
        }
        if let Some(topic) = pick.topic {
            if self.topic_counts.get(topic).copied().unwrap_or(0) >= self.topic_cap {
                return Gate::TopicCapped;
            }
        }
        Gate::Accept
    }

    fn record(&mut self, pick: &Pick) {
        self.titles.push(pick.title.clone());
        for entity in &pick.entities {
            *self.entity_counts.entry(entity.clone()).or_insert(0) += 1;
        }
        if let Some(topic) = pick.topic {
            *self.topic_counts.entry(topic).or_insert(0) += 1;
        }
    }
}

/// Links of other group members in rank order, skipping the representative's
/// link and repeats.
fn related_links(candidates: &[CandidateItem], group: &EventGroup) -> Vec<String> {
    let representative = &candidates[group.representative].link;
    let mut others: Vec<usize> = group
        .members
        .iter()
        .copied()
        .filter(|&i| i != group.representative)
        .collect();
    others.sort_by_key(|&i| (candidates[i].rank, i));

    let mut links: Vec<String> = Vec::new();
    for i in others {
        let link = &candidates[i].link;
        if link == representative || links.contains(link) {
            continue;
        }
        links.push(link.clone());
        if links.len() == MAX_RELATED_LINKS {
            break;
        }
    }
    links
}

/// Rank groups and greedily pick up to `top_k` representatives.
///
/// Groups are ordered by importance, then relevance (both descending), then
/// representative rank and index (ascending). Groups at or above the
/// relevance floor are considered first; if fewer than `top_k` are accepted,
/// groups below the floor backfill in the same order. Every acceptance, in
/// either pass, respects the near-duplicate, per-entity and per-topic limits.
#[must_use]
pub fn rank_and_select(
    candidates: &[CandidateItem],
    groups: &[EventGroup],
    params: &SelectionParams,
) -> RankedSelection {
    let (selection, stats) = rank_and_select_with_stats(candidates, groups, params);
    tracing::debug!(
        selected = selection.len(),
        below_floor = stats.below_floor,
        near_duplicate = stats.near_duplicate,
        entity_capped = stats.entity_capped,
        topic_capped = stats.topic_capped,
        backfilled = stats.backfilled,
        "ranked selection built"
    );
    selection
}

/// [`rank_and_select`] plus counters for what was skipped and why.
#[must_use]
pub fn rank_and_select_with_stats(
    candidates: &[CandidateItem],
    groups: &[EventGroup],
    params: &SelectionParams,
) -> (RankedSelection, SelectionStats) {
    let mut stats = SelectionStats::default();
    let mut selection = RankedSelection::default();
    if params.top_k == 0 {
        return (selection, stats);
    }

    let mut ordered: Vec<&EventGroup> = groups.iter().collect();
    ordered.sort_by_key(|g| {
        (
            Reverse(g.importance),
            Reverse(g.relevance),
            candidates[g.representative].rank,
            g.representative,
        )
    });

    let (above, below): (Vec<&EventGroup>, Vec<&EventGroup>) = ordered
        .into_iter()
        .partition(|g| g.relevance >= params.relevance_floor);
    stats.below_floor = below.len();

    let mut diversity = DiversityFilter::new(params);
    for (pass, backfilled) in [(above, false), (below, true)] {
        for group in pass {
            if selection.len() == params.top_k {
                return (selection, stats);
            }
            let candidate = &candidates[group.representative];
            let pick = Pick {
                title: PreparedTitle::new(&candidate.title),
                entities: extract_entities(&candidate.title),
                topic: extract_topic(&candidate.title),
            };
            match diversity.check(&pick) {
                Gate::Accept => {}
                Gate::NearDuplicate => {
                    stats.near_duplicate += 1;
                    continue;
                }
                Gate::EntityCapped => {
                    stats.entity_capped += 1;
                    continue;
                }
                Gate::TopicCapped => {
                    stats.topic_capped += 1;
                    continue;
                }
            }
            diversity.record(&pick);
            if backfilled {
                stats.backfilled += 1;
            }
            selection.items.push(SelectedItem {
                candidate: candidate.clone(),
                relevance: group.relevance,
                importance: group.importance,
                entities: pick.entities,
                topic: pick.topic,
                group_size: group.members.len(),
                backfilled,
                related_links: related_links(candidates, group),
            });
        }
    }

    (selection, stats)
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
