use std::collections::BTreeSet;

use super::*;
use crate::classify::{RawVerdict, Verdict};
use crate::test_support::{candidate, candidates, flat_scores, score};

const HEADLINES: &[&str] = &[
    "LG에너지솔루션, 1조원 규모 양극재 공급계약 체결",
    "LG에너지솔루션 1조원대 양극재 공급계약",
    "삼성SDI 신규 ESS 공장 착공",
    "[단독] 삼성SDI, 신규 ESS 공장 착공",
    "CATL unveils second-generation sodium-ion pack",
    "에코프로비엠 헝가리 양극재 공장 준공",
    "정부, 배터리 재활용 보조금 확대",
];

fn assert_partition(groups: &[EventGroup], n: usize) {
    let mut seen = BTreeSet::new();
    for group in groups {
        assert!(group.members.contains(&group.representative));
        for &m in &group.members {
            assert!(seen.insert(m), "index {m} appears in more than one group");
        }
    }
    assert_eq!(seen, (0..n).collect::<BTreeSet<_>>(), "groups must cover every index");
}

fn verdict(key: &str, relevance: u8, importance: u8) -> Option<Verdict> {
    Some(Verdict {
        event_key: key.to_string(),
        relevance,
        importance,
    })
}

#[test]
fn pairwise_merges_near_identical_headlines() {
    let items = candidates(&HEADLINES[..3]);
    let groups = group_by_similarity(&items, &flat_scores(3), 0.85);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].members, vec![0, 1]);
    assert_eq!(groups[0].representative, 0);
    assert_eq!(groups[1].members, vec![2]);
}

#[test]
fn pairwise_groups_partition_input() {
    let items = candidates(HEADLINES);
    for threshold in [0.0, 0.5, 0.85, 1.0] {
        let groups = group_by_similarity(&items, &flat_scores(items.len()), threshold);
        assert_partition(&groups, items.len());
    }
}

#[test]
fn raising_threshold_never_reduces_group_count() {
    let items = candidates(HEADLINES);
    let scores = flat_scores(items.len());
    let counts: Vec<usize> = [0.0, 0.6, 0.85, 0.9, 0.99, 1.0]
        .iter()
        .map(|&t| group_by_similarity(&items, &scores, t).len())
        .collect();
    assert!(
        counts.windows(2).all(|w| w[0] <= w[1]),
        "group counts not monotone: {counts:?}"
    );
    assert_eq!(counts[0], 1);
}

#[test]
fn pairwise_respects_rank_not_input_position() {
    // The later-ranked duplicate sits first in the input.
    let items = vec![candidate(HEADLINES[1], 5), candidate(HEADLINES[0], 1)];
    let groups = group_by_similarity(&items, &flat_scores(2), 0.85);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].representative, 1);
}

#[test]
fn single_candidate_is_its_own_group() {
    let items = candidates(&HEADLINES[..1]);
    let result = ClassifierResult::from_verdicts(vec![verdict("k", 90, 90)]);
    let groups = group_events(&items, &flat_scores(1), Some(&result), 0.88);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![0]);
}

#[test]
fn empty_input_has_no_groups() {
    assert!(group_events(&[], &[], None, 0.88).is_empty());
}

#[test]
fn keyed_grouping_follows_event_keys() {
    let items = candidates(&["a 소식", "b 소식", "c 소식", "d 소식"]);
    let result = ClassifierResult::from_verdicts(vec![
        verdict("x", 80, 40),
        verdict("y", 70, 50),
        verdict("x", 80, 60),
        verdict("y", 90, 50),
    ]);
    let scores: Vec<ItemScore> = (0..4)
        .map(|i| {
            let v = result.get(i).unwrap();
            score(v.relevance, v.importance)
        })
        .collect();
    let groups = group_events(&items, &scores, Some(&result), 0.88);
    assert_partition(&groups, 4);
    assert_eq!(groups.len(), 2);

    let x = groups.iter().find(|g| g.members == vec![0, 2]).unwrap();
    // highest importance wins
    assert_eq!(x.representative, 2);
    assert_eq!(x.importance, 60);

    let y = groups.iter().find(|g| g.members == vec![1, 3]).unwrap();
    // importance tie, higher relevance wins
    assert_eq!(y.representative, 3);
}

#[test]
fn keyed_representative_tie_breaks_on_rank() {
    let items = vec![candidate("뒤 기사", 9), candidate("앞 기사", 2)];
    let result = ClassifierResult::from_verdicts(vec![verdict("k", 70, 70), verdict("k", 70, 70)]);
    let scores = vec![score(70, 70); 2];
    let groups = group_events(&items, &scores, Some(&result), 0.88);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].representative, 1);
}

#[test]
fn partial_result_attaches_missing_items_by_similarity() {
    let items = candidates(&HEADLINES[..3]);
    let result = ClassifierResult::from_entries(
        3,
        vec![
            RawVerdict {
                index: 0,
                event_key: Some("lges-cathode".into()),
                battery_relevance: Some(95.0),
                monitoring_importance: Some(85.0),
            },
            RawVerdict {
                index: 2,
                event_key: Some("sdi-ess".into()),
                battery_relevance: Some(90.0),
                monitoring_importance: Some(60.0),
            },
        ],
    );
    let scores = vec![score(95, 85), score(60, 40), score(90, 60)];
    let groups = group_events(&items, &scores, Some(&result), 0.85);
    assert_partition(&groups, 3);
    assert_eq!(groups.len(), 2);
    let lges = groups.iter().find(|g| g.members.contains(&0)).unwrap();
    assert_eq!(lges.members, vec![0, 1]);
    assert_eq!(lges.representative, 0);
}

#[test]
fn partial_result_unmatched_item_forms_singleton() {
    let items = candidates(&[HEADLINES[0], HEADLINES[4]]);
    let result = ClassifierResult::from_verdicts(vec![verdict("k", 90, 90), None]);
    let groups = group_events(&items, &flat_scores(2), Some(&result), 0.88);
    assert_eq!(groups.len(), 2);
    assert_partition(&groups, 2);
}

#[test]
fn mismatched_result_length_falls_back_to_similarity() {
    let items = candidates(&HEADLINES[..3]);
    let result = ClassifierResult::from_verdicts(vec![verdict("same", 90, 90); 2]);
    let groups = group_events(&items, &flat_scores(3), Some(&result), 0.85);
    assert_eq!(groups.len(), 2);
}

#[test]
fn all_missing_result_falls_back_to_similarity() {
    let items = candidates(&HEADLINES[..3]);
    let result = ClassifierResult::from_verdicts(vec![None, None, None]);
    let groups = group_events(&items, &flat_scores(3), Some(&result), 0.85);
    assert_eq!(groups.len(), 2);
    assert_partition(&groups, 3);
}
