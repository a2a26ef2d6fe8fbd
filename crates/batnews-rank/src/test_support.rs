use batnews_core::{reference_offset, CandidateItem, Provider};
use chrono::TimeZone;

use crate::classify::{ItemScore, ScoreSource};

pub(crate) fn candidate(title: &str, rank: u32) -> CandidateItem {
    CandidateItem {
        title: title.to_string(),
        description: String::new(),
        link: format!("https://news.example.com/{rank}"),
        source: "example".to_string(),
        published_at: reference_offset()
            .with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
            .unwrap(),
        rank,
        provider: Provider::Naver,
    }
}

pub(crate) fn candidates(titles: &[&str]) -> Vec<CandidateItem> {
    titles
        .iter()
        .zip(0_u32..)
        .map(|(t, rank)| candidate(t, rank))
        .collect()
}

pub(crate) fn score(relevance: u8, importance: u8) -> ItemScore {
    ItemScore {
        relevance,
        importance,
        source: ScoreSource::Classifier,
    }
}

pub(crate) fn flat_scores(n: usize) -> Vec<ItemScore> {
    vec![score(60, 10); n]
}
