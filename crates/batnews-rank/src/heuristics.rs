//! Keyword-weighted importance, used when no classifier verdict exists.
//!
//! Hangul terms match as substrings, since particles attach directly to the
//! noun. Latin terms match whole words, allowing common inflections, so
//! `invest` hits "investment" but not "investigation".

use std::sync::LazyLock;

use regex::Regex;

/// Score every headline starts from.
const BASE_SCORE: u32 = 10;

/// Added once per distinct high-impact term found.
const HIGH_IMPACT_WEIGHT: u32 = 15;

/// Added once per distinct moderate term found.
const MODERATE_WEIGHT: u32 = 5;

/// Investment, capacity expansion, supply contracts, M&A, regulation, tariffs,
/// recalls, breakthroughs and earnings.
const HIGH_IMPACT_TERMS: &[&str] = &[
    "투자",
    "invest",
    "증설",
    "양산",
    "capacity",
    "expansion",
    "공급계약",
    "수주",
    "supply deal",
    "supply agreement",
    "contract",
    "인수",
    "합병",
    "m&a",
    "acquisition",
    "merger",
    "규제",
    "regulation",
    "관세",
    "tariff",
    "리콜",
    "recall",
    "세계 최초",
    "breakthrough",
    "실적",
    "영업이익",
    "earnings",
    "profit",
];

const MODERATE_TERMS: &[&str] = &[
    "공장",
    "plant",
    "factory",
    "gigafactory",
    "mou",
    "협약",
    "partnership",
    "보조금",
    "subsidy",
    "특허",
    "patent",
    "착공",
    "준공",
    "조원",
    "billion",
    "정책",
    "policy",
    "개발",
    "pilot",
];

enum Term {
    Substring(&'static str),
    Word(Regex),
}

impl Term {
    fn new(term: &'static str) -> Self {
        if term.is_ascii() {
            let pattern = format!(r"\b{}(?:s|es|ed|ing|ment|ments)?\b", regex::escape(term));
            Term::Word(Regex::new(&pattern).expect("valid regex"))
        } else {
            Term::Substring(term)
        }
    }

    fn is_in(&self, lowered: &str) -> bool {
        match self {
            Term::Substring(t) => lowered.contains(t),
            Term::Word(re) => re.is_match(lowered),
        }
    }
}

static HIGH_IMPACT: LazyLock<Vec<Term>> =
    LazyLock::new(|| HIGH_IMPACT_TERMS.iter().map(|t| Term::new(t)).collect());

static MODERATE: LazyLock<Vec<Term>> =
    LazyLock::new(|| MODERATE_TERMS.iter().map(|t| Term::new(t)).collect());

/// Importance in `0..=100` from keyword hits in the lower-cased headline.
#[must_use]
pub fn heuristic_importance(title: &str) -> u8 {
    let lowered = title.to_lowercase();
    let hits = |terms: &[Term]| -> u32 {
        let count = terms.iter().filter(|t| t.is_in(&lowered)).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    };

    let score = BASE_SCORE
        .saturating_add(hits(&HIGH_IMPACT).saturating_mul(HIGH_IMPACT_WEIGHT))
        .saturating_add(hits(&MODERATE).saturating_mul(MODERATE_WEIGHT));

    u8::try_from(score.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_headline_gets_base_score() {
        assert_eq!(heuristic_importance("배터리 업계 CEO 간담회"), 10);
    }

    #[test]
    fn expansion_and_investment_beat_neutral() {
        let hot = heuristic_importance("SK온, 헝가리 공장 증설 투자 발표");
        let neutral = heuristic_importance("배터리 업계 CEO 간담회");
        assert!(hot > neutral, "{hot} should exceed {neutral}");
        // 증설 + 투자 high, 공장 moderate
        assert_eq!(hot, 10 + 15 * 2 + 5);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            heuristic_importance("Tesla RECALL"),
            heuristic_importance("tesla recall")
        );
    }

    #[test]
    fn score_is_clamped_to_hundred() {
        let title = "투자 증설 양산 수주 인수 합병 규제 관세 리콜 실적 영업이익 earnings";
        assert_eq!(heuristic_importance(title), 100);
    }

    #[test]
    fn latin_terms_match_whole_words_only() {
        assert_eq!(heuristic_importance("Regulators open investigation into cell maker"), 10);
        assert_eq!(heuristic_importance("Nonprofit warns of demand contraction"), 10);
        assert_eq!(heuristic_importance("Northvolt investment talks"), 25);
        assert_eq!(heuristic_importance("Panasonic profits rise"), 25);
    }

    #[test]
    fn korean_terms_match_inside_words() {
        assert_eq!(heuristic_importance("에코프로, 투자를 확대"), 25);
    }

    #[test]
    fn empty_title_gets_base_score() {
        assert_eq!(heuristic_importance(""), 10);
    }
}
