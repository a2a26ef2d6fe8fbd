use super::*;

fn raw(index: i64, key: &str, relevance: f64, importance: f64) -> RawVerdict {
    RawVerdict {
        index,
        event_key: Some(key.to_string()),
        battery_relevance: Some(relevance),
        monitoring_importance: Some(importance),
    }
}

const POLICY: FallbackPolicy = FallbackPolicy {
    default_relevance: 60,
};

#[test]
fn from_entries_places_verdicts_by_index() {
    let result = ClassifierResult::from_entries(
        3,
        vec![raw(2, "ess-plant", 90.0, 70.0), raw(0, "lges-deal", 95.0, 80.0)],
    );
    assert_eq!(result.len(), 3);
    assert_eq!(result.get(0).unwrap().event_key, "lges-deal");
    assert!(result.get(1).is_none());
    assert_eq!(result.get(2).unwrap().importance, 70);
    assert_eq!(result.missing_count(), 1);
}

#[test]
fn out_of_range_and_negative_indices_are_dropped() {
    let result =
        ClassifierResult::from_entries(2, vec![raw(5, "x", 50.0, 50.0), raw(-1, "y", 50.0, 50.0)]);
    assert!(result.is_all_missing());
}

#[test]
fn duplicate_index_keeps_first_entry() {
    let result =
        ClassifierResult::from_entries(1, vec![raw(0, "first", 10.0, 10.0), raw(0, "second", 99.0, 99.0)]);
    assert_eq!(result.get(0).unwrap().event_key, "first");
}

#[test]
fn scores_are_clamped_and_rounded() {
    let result = ClassifierResult::from_entries(
        2,
        vec![raw(0, "a", 140.0, -3.0), raw(1, "b", 54.6, f64::NAN)],
    );
    let a = result.get(0).unwrap();
    assert_eq!((a.relevance, a.importance), (100, 0));
    let b = result.get(1).unwrap();
    assert_eq!((b.relevance, b.importance), (55, 0));
}

#[test]
fn blank_key_or_missing_score_is_treated_as_missing() {
    let entries = vec![
        raw(0, "   ", 80.0, 80.0),
        RawVerdict {
            index: 1,
            event_key: Some("k".into()),
            battery_relevance: None,
            monitoring_importance: Some(40.0),
        },
    ];
    let result = ClassifierResult::from_entries(2, entries);
    assert!(result.is_all_missing());
}

#[test]
fn long_event_keys_are_truncated() {
    let long = "가".repeat(200);
    let result = ClassifierResult::from_entries(1, vec![raw(0, &long, 1.0, 1.0)]);
    assert_eq!(
        result.get(0).unwrap().event_key.chars().count(),
        MAX_EVENT_KEY_CHARS
    );
}

#[test]
fn raw_verdict_accepts_short_field_aliases() {
    let parsed: RawVerdict =
        serde_json::from_str(r#"{"index":0,"event_key":"k","relevance":70,"importance":30}"#)
            .unwrap();
    assert_eq!(parsed.battery_relevance, Some(70.0));
    assert_eq!(parsed.monitoring_importance, Some(30.0));
}

#[test]
fn resolve_scores_without_result_uses_fallback_for_all() {
    let titles = ["SK온, 헝가리 공장 증설 투자 발표", "배터리 업계 CEO 간담회"];
    let scores = resolve_scores(&titles, None, &POLICY);
    assert!(scores.iter().all(|s| s.source == ScoreSource::Heuristic));
    assert!(scores.iter().all(|s| s.relevance == 60));
    assert!(scores[0].importance > scores[1].importance);
}

#[test]
fn resolve_scores_mixes_classifier_and_fallback() {
    let titles = ["a", "b"];
    let result = ClassifierResult::from_entries(2, vec![raw(1, "k", 88.0, 77.0)]);
    let scores = resolve_scores(&titles, Some(&result), &POLICY);
    assert_eq!(scores[0].source, ScoreSource::Heuristic);
    assert_eq!(
        scores[1],
        ItemScore {
            relevance: 88,
            importance: 77,
            source: ScoreSource::Classifier
        }
    );
}
