use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// UTC offset of the reference timezone (KST, UTC+9) all publish times are
/// converted into.
const REFERENCE_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// The fixed reference timezone used for recency windows and output dates.
#[must_use]
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_UTC_OFFSET_SECS).expect("valid UTC offset")
}

/// News provider that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Naver,
    Google,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Naver => write!(f, "naver"),
            Provider::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "naver" => Ok(Provider::Naver),
            "google" => Ok(Provider::Google),
            other => Err(format!("unknown provider '{other}'; expected naver or google")),
        }
    }
}

/// One fetched news record, normalized by a collector.
///
/// Immutable once built. `link` is unique within a single collection run and
/// `rank` is the provider-native fetch position (0 = most prominent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub title: String,
    /// Plain text, HTML stripped.
    pub description: String,
    /// Canonical URL with tracking parameters removed.
    pub link: String,
    /// Publisher name, or the link's domain when the provider gives none.
    pub source: String,
    /// Publish time in the reference timezone.
    pub published_at: DateTime<FixedOffset>,
    pub rank: u32,
    pub provider: Provider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_offset_is_utc_plus_nine() {
        assert_eq!(reference_offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn provider_round_trips_through_display_and_from_str() {
        for p in [Provider::Naver, Provider::Google] {
            let parsed: Provider = p.to_string().parse().unwrap();
            assert_eq!(parsed, p);
        }
    }

    #[test]
    fn provider_from_str_is_case_insensitive() {
        assert_eq!(" NAVER ".parse::<Provider>().unwrap(), Provider::Naver);
    }

    #[test]
    fn provider_from_str_rejects_unknown() {
        let err = "bing".parse::<Provider>().unwrap_err();
        assert!(err.contains("bing"), "unexpected message: {err}");
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&Provider::Google).unwrap();
        assert_eq!(json, "\"google\"");
    }
}
