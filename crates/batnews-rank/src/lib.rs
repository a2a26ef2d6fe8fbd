//! Dedupe, scoring and selection for battery news candidates.
//!
//! Everything here is a pure function of its inputs: thresholds and caps are
//! passed in explicitly, nothing reads the environment, and identical inputs
//! always produce identical selections.

pub mod classify;
pub mod extract;
pub mod grouping;
pub mod heuristics;
pub mod selector;
pub mod similarity;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use classify::{
    resolve_scores, ClassifierResult, FallbackPolicy, ItemScore, RawVerdict, ScoreSource, Verdict,
};
pub use extract::{extract_entities, extract_topic};
pub use grouping::{cluster_in_order, group_by_similarity, group_events, rank_order, EventGroup};
pub use heuristics::heuristic_importance;
pub use selector::{
    rank_and_select, rank_and_select_with_stats, DiversityFilter, RankedSelection, SelectedItem,
    SelectionParams, SelectionStats, MAX_RELATED_LINKS,
};
pub use similarity::{similarity, PreparedTitle};
pub use text::normalize_title;
