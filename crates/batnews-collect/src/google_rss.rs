//! Google News RSS search collector.

use std::time::Duration;

use batnews_core::Provider;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::CollectError;
use crate::feed::parse_rss_items;
use crate::intake::{CollectReport, Intake, RawEntry, RecencyWindow};

const DEFAULT_BASE_URL: &str = "https://news.google.com";
const LOCALE_PARAMS: &str = "hl=en-US&gl=US&ceid=US:en";

pub struct GoogleNewsClient {
    client: Client,
    base_url: String,
}

impl GoogleNewsClient {
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CollectError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CollectError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn feed_url(&self, query: &str) -> String {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
        format!("{}/rss/search?q={encoded}&{LOCALE_PARAMS}", self.base_url)
    }

    /// Fetch and parse the search feed for one query.
    ///
    /// # Errors
    ///
    /// - [`CollectError::Http`] on network failure.
    /// - [`CollectError::UnexpectedStatus`] on a non-2xx response.
    /// - [`CollectError::Xml`] if the feed is not well-formed.
    pub async fn fetch_feed(&self, query: &str) -> Result<Vec<RawEntry>, CollectError> {
        let url = self.feed_url(query);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        parse_rss_items(&body)
    }

    /// Collect up to `max_fetch` recent items, one feed per query.
    ///
    /// Feeds are not strictly newest-first, so every entry is checked against
    /// the window. A failed feed is logged and counted, never propagated.
    pub async fn collect(
        &self,
        queries: &[String],
        max_fetch: usize,
        window: RecencyWindow,
    ) -> CollectReport {
        let mut intake = Intake::new(Provider::Google, window, max_fetch, "Google News");

        for query in queries {
            if intake.is_full() {
                break;
            }
            match self.fetch_feed(query).await {
                Ok(entries) => {
                    for entry in entries {
                        intake.offer(entry);
                    }
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "google news feed fetch failed");
                    intake.record_failure();
                }
            }
        }

        let report = intake.finish();
        tracing::info!(
            provider = "google",
            collected = report.items.len(),
            stale = report.stale,
            duplicates = report.duplicates,
            unusable = report.unusable,
            failed_requests = report.failed_requests,
            "google news collection finished"
        );
        report
    }
}
