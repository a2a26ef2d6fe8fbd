//! Dedupe & event grouping.
//!
//! Produces a partition of the candidate indices: every candidate lands in
//! exactly one [`EventGroup`]. With a usable classifier result, groups follow
//! the classifier's event keys; otherwise headlines are clustered greedily by
//! similarity in rank order.

use std::cmp::Reverse;
use std::collections::HashMap;

use batnews_core::CandidateItem;

use crate::classify::{ClassifierResult, ItemScore};
use crate::similarity::PreparedTitle;

/// Candidates judged to report the same event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup {
    /// Candidate indices, ascending.
    pub members: Vec<usize>,
    pub representative: usize,
    pub relevance: u8,
    pub importance: u8,
}

/// Candidate indices in provider-native order: `rank` ascending, then input
/// position.
#[must_use]
pub fn rank_order(candidates: &[CandidateItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| (candidates[i].rank, i));
    order
}

/// Greedy leader clustering over `order`.
///
/// Each index joins the existing cluster whose leader it is most similar to
/// (earliest cluster on ties) when that similarity reaches `threshold`, and
/// otherwise leads a new cluster. The first element of each returned cluster
/// is its leader.
#[must_use]
pub fn cluster_in_order(
    titles: &[PreparedTitle],
    order: &[usize],
    threshold: f64,
) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for &i in order {
        let best = best_match(&titles[i], clusters.iter().map(|c| &titles[c[0]]));
        match best {
            Some((pos, score)) if score >= threshold => clusters[pos].push(i),
            _ => clusters.push(vec![i]),
        }
    }

    clusters
}

/// Index and score of the most similar title; the earliest wins ties.
fn best_match<'a>(
    title: &PreparedTitle,
    leaders: impl Iterator<Item = &'a PreparedTitle>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (pos, leader) in leaders.enumerate() {
        let score = title.similarity(leader);
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((pos, score));
        }
    }
    best
}

/// Group candidates by pairwise headline similarity.
///
/// The earliest candidate in rank order represents its group, so prominent
/// items win over later duplicates.
#[must_use]
pub fn group_by_similarity(
    candidates: &[CandidateItem],
    scores: &[ItemScore],
    threshold: f64,
) -> Vec<EventGroup> {
    let titles = prepare(candidates);
    let order = rank_order(candidates);

    cluster_in_order(&titles, &order, threshold)
        .into_iter()
        .map(|members| {
            let representative = members[0];
            build_group(members, representative, scores)
        })
        .collect()
}

/// Group candidates, preferring classifier event keys when available.
///
/// A classifier result is used only when it covers this exact batch and has
/// at least one verdict. Candidates it left out are attached to the most
/// similar existing group at `threshold`, or form their own.
#[must_use]
pub fn group_events(
    candidates: &[CandidateItem],
    scores: &[ItemScore],
    classifier: Option<&ClassifierResult>,
    threshold: f64,
) -> Vec<EventGroup> {
    match classifier {
        Some(result)
            if candidates.len() > 1
                && result.len() == candidates.len()
                && !result.is_all_missing() =>
        {
            group_by_event_key(candidates, scores, result, threshold)
        }
        _ => group_by_similarity(candidates, scores, threshold),
    }
}

fn group_by_event_key(
    candidates: &[CandidateItem],
    scores: &[ItemScore],
    result: &ClassifierResult,
    threshold: f64,
) -> Vec<EventGroup> {
    let titles = prepare(candidates);
    let order = rank_order(candidates);

    let mut key_slots: HashMap<&str, usize> = HashMap::new();
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut unkeyed = Vec::new();

    for &i in &order {
        match result.get(i) {
            Some(verdict) => {
                let slot = *key_slots.entry(verdict.event_key.as_str()).or_insert_with(|| {
                    clusters.push(Vec::new());
                    clusters.len() - 1
                });
                clusters[slot].push(i);
            }
            None => unkeyed.push(i),
        }
    }

    let mut reps: Vec<usize> = clusters
        .iter()
        .map(|members| pick_by_score(members, candidates, scores))
        .collect();

    for i in unkeyed {
        let best = best_match(&titles[i], reps.iter().map(|&r| &titles[r]));
        match best {
            Some((pos, score)) if score >= threshold => clusters[pos].push(i),
            _ => {
                clusters.push(vec![i]);
                reps.push(i);
            }
        }
    }

    tracing::debug!(
        keyed = key_slots.len(),
        groups = clusters.len(),
        "grouped candidates by event key"
    );

    clusters
        .into_iter()
        .zip(reps)
        .map(|(members, rep)| build_group(members, rep, scores))
        .collect()
}

/// Highest importance, then highest relevance, then lowest rank.
fn pick_by_score(members: &[usize], candidates: &[CandidateItem], scores: &[ItemScore]) -> usize {
    members
        .iter()
        .copied()
        .min_by_key(|&i| {
            (
                Reverse(scores[i].importance),
                Reverse(scores[i].relevance),
                candidates[i].rank,
                i,
            )
        })
        .unwrap_or_default()
}

fn build_group(mut members: Vec<usize>, representative: usize, scores: &[ItemScore]) -> EventGroup {
    members.sort_unstable();
    EventGroup {
        members,
        representative,
        relevance: scores[representative].relevance,
        importance: scores[representative].importance,
    }
}

fn prepare(candidates: &[CandidateItem]) -> Vec<PreparedTitle> {
    candidates
        .iter()
        .map(|c| PreparedTitle::new(&c.title))
        .collect()
}

#[cfg(test)]
#[path = "grouping_test.rs"]
mod tests;
