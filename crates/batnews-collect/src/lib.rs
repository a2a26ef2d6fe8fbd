//! Candidate collection from news providers.
//!
//! Each provider client turns search responses into [`CandidateItem`]s via a
//! shared [`Intake`], which owns recency filtering, link dedupe and ranking.
//! Collection never fails as a whole: transport and parse errors are logged
//! per request and surface only as counters on the [`CollectReport`].
//!
//! [`CandidateItem`]: batnews_core::CandidateItem

pub mod error;
pub mod feed;
pub mod google_rss;
pub mod intake;
pub mod naver;
pub mod normalize;

pub use error::CollectError;
pub use google_rss::GoogleNewsClient;
pub use intake::{CollectReport, Intake, Offer, RawEntry, RecencyWindow};
pub use naver::NaverClient;
pub use normalize::{domain_of, normalize_link};

/// What a provider contributed to a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Collected(CollectReport),
    /// The provider was not queried, e.g. because credentials are missing.
    Skipped { reason: String },
}

impl ProviderOutcome {
    /// Candidates collected, empty when skipped.
    #[must_use]
    pub fn into_items(self) -> Vec<batnews_core::CandidateItem> {
        match self {
            ProviderOutcome::Collected(report) => report.items,
            ProviderOutcome::Skipped { .. } => Vec::new(),
        }
    }
}
