//! Rule-based entity and topic tagging for diversity capping.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum entities reported per headline.
pub const MAX_ENTITIES: usize = 2;

/// Well-known industry names. Longer names come first so the alternation
/// prefers `포스코홀딩스` over `포스코`.
static BRANDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(LG에너지솔루션|삼성SDI|SK온|SK이노베이션|포스코퓨처엠|포스코홀딩스|포스코|에코프로비엠|에코프로|엘앤에프|LG화학|CATL|BYD|Panasonic|Tesla|Northvolt)",
    )
    .expect("valid regex")
});

/// Corporate and institutional name suffixes.
static SUFFIXED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([가-힣A-Za-z0-9·&.\-]{2,24}?(?:그룹|홀딩스|에너지|화학|전지|머티리얼즈|머티리얼|소재|제철|산업|전자|솔루션|엔솔|이노베이션|모빌리티|테크놀로지|테크|리서치|캐피탈|SDI))",
    )
    .expect("valid regex")
});

static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,.)\]\-·&]+$").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "정부", "업계", "시장", "한국", "미국", "중국", "유럽", "국내", "해외", "배터리", "전고체",
    "나트륨", "리튬", "전기차", "소재", "산업", "협회", "연구", "대학", "위원회", "부처", "관계자",
    "당국", "신재생에너지", "친환경에너지", "2차전지", "이차전지", "양극소재", "음극소재",
];

/// Topic tag to keyword list, checked in order; the first hit wins.
const TOPICS: &[(&str, &[&str])] = &[
    (
        "cathode",
        &[
            "cathode", "양극", "ncm", "lfp", "lco", "nca", "nickel", "니켈", "망간", "코발트",
            "철인산", "전구체",
        ],
    ),
    (
        "anode",
        &["anode", "음극", "silicon", "graphite", "흑연", "실리콘"],
    ),
    (
        "electrolyte",
        &["electrolyte", "전해질", "전해액", "additive", "첨가제"],
    ),
    ("separator", &["separator", "분리막", "membrane"]),
    (
        "solid_state",
        &["solid-state", "solid state", "전고체", "고체전해질", "sulfide", "황화물"],
    ),
    ("sodium_ion", &["sodium-ion", "sodium ion", "나트륨", "na-ion"]),
    (
        "recycling",
        &[
            "recycling", "recycle", "재활용", "black mass", "블랙매스", "hydrometallurgy",
            "리사이클",
        ],
    ),
    (
        "equipment",
        &["equipment", "장비", "coater", "dry electrode", "건식 전극", "formation", "코팅"],
    ),
    (
        "policy",
        &[
            "policy", "regulation", "규제", "subsidy", "보조금", "inflation reduction", "crma",
            "cbam", "tariff", "관세", "정책",
        ],
    ),
];

/// Company or institution names in a raw headline, at most [`MAX_ENTITIES`].
///
/// Brand-list hits come before suffix-pattern hits; a name already covered by
/// a longer accepted name is skipped.
#[must_use]
pub fn extract_entities(title: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    let brand_hits = BRANDS.find_iter(title).map(|m| m.as_str());
    let suffix_hits = SUFFIXED_NAME.find_iter(title).map(|m| m.as_str());

    for raw in brand_hits.chain(suffix_hits) {
        let name = TRAILING_PUNCT.replace(raw.trim(), "").into_owned();
        if name.chars().count() < 2 || STOPWORDS.contains(&name.as_str()) {
            continue;
        }
        if found.iter().any(|f| f.contains(name.as_str()) || name.contains(f.as_str())) {
            continue;
        }
        found.push(name);
        if found.len() == MAX_ENTITIES {
            break;
        }
    }

    found
}

/// First matching topic tag for a headline, if any.
#[must_use]
pub fn extract_topic(title: &str) -> Option<&'static str> {
    let lowered = title.to_lowercase();
    TOPICS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(topic, _)| *topic)
}
