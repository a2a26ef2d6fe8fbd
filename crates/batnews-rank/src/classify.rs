//! Classifier verdicts and the fallback that fills in whatever is missing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::heuristics::heuristic_importance;

/// Longest event key kept from a classifier response, in characters.
pub const MAX_EVENT_KEY_CHARS: usize = 80;

/// One entry as a classifier returns it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVerdict {
    pub index: i64,
    #[serde(default)]
    pub event_key: Option<String>,
    #[serde(default, alias = "relevance")]
    pub battery_relevance: Option<f64>,
    #[serde(default, alias = "importance")]
    pub monitoring_importance: Option<f64>,
}

/// A validated verdict for a single headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub event_key: String,
    pub relevance: u8,
    pub importance: u8,
}

/// Per-index classifier output for a batch of `n` headlines.
///
/// Slot `i` holds the verdict for input `i`, or `None` when the classifier
/// left it out or returned something unusable for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierResult {
    verdicts: Vec<Option<Verdict>>,
}

impl ClassifierResult {
    /// Validate raw entries against a batch of `n` inputs.
    ///
    /// Out-of-range indices, repeated indices (first wins), blank keys and
    /// entries without both scores are dropped. Scores are clamped to
    /// `0..=100`.
    #[must_use]
    pub fn from_entries(n: usize, entries: Vec<RawVerdict>) -> Self {
        let mut verdicts: Vec<Option<Verdict>> = vec![None; n];
        let mut seen = HashSet::new();

        for entry in entries {
            let Ok(index) = usize::try_from(entry.index) else {
                continue;
            };
            if index >= n || !seen.insert(index) {
                continue;
            }
            let Some(key) = entry.event_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
            else {
                continue;
            };
            let (Some(relevance), Some(importance)) =
                (entry.battery_relevance, entry.monitoring_importance)
            else {
                continue;
            };

            verdicts[index] = Some(Verdict {
                event_key: key.chars().take(MAX_EVENT_KEY_CHARS).collect(),
                relevance: clamp_score(relevance),
                importance: clamp_score(importance),
            });
        }

        Self { verdicts }
    }

    #[must_use]
    pub fn from_verdicts(verdicts: Vec<Option<Verdict>>) -> Self {
        Self { verdicts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Verdict> {
        self.verdicts.get(index).and_then(Option::as_ref)
    }

    /// Number of inputs with no usable verdict.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_none()).count()
    }

    /// True when no input received a verdict.
    #[must_use]
    pub fn is_all_missing(&self) -> bool {
        self.verdicts.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn into_verdicts(self) -> Vec<Option<Verdict>> {
        self.verdicts
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Where an item's scores came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Classifier,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemScore {
    pub relevance: u8,
    pub importance: u8,
    pub source: ScoreSource,
}

/// Scoring defaults for items the classifier did not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub default_relevance: u8,
}

/// Scores for each title: the classifier verdict when present, otherwise the
/// policy's default relevance and keyword-heuristic importance.
#[must_use]
pub fn resolve_scores(
    titles: &[&str],
    result: Option<&ClassifierResult>,
    policy: &FallbackPolicy,
) -> Vec<ItemScore> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| match result.and_then(|r| r.get(i)) {
            Some(v) => ItemScore {
                relevance: v.relevance,
                importance: v.importance,
                source: ScoreSource::Classifier,
            },
            None => ItemScore {
                relevance: policy.default_relevance,
                importance: heuristic_importance(title),
                source: ScoreSource::Heuristic,
            },
        })
        .collect()
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
