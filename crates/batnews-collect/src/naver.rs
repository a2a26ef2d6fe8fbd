//! Naver news search API collector.

use std::time::Duration;

use batnews_core::Provider;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::CollectError;
use crate::intake::{CollectReport, Intake, Offer, RawEntry, RecencyWindow};
use crate::normalize::{clean_text, split_publisher_tail};

const DEFAULT_BASE_URL: &str = "https://openapi.naver.com/";
const SEARCH_PATH: &str = "v1/search/news.json";

/// Largest page the API serves.
const MAX_DISPLAY: usize = 100;

/// Highest `start` offset the API accepts.
const MAX_START: usize = 1000;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
}

impl From<SearchItem> for RawEntry {
    fn from(item: SearchItem) -> Self {
        let (title, source) = split_publisher_tail(&clean_text(&item.title));
        let link = if item.originallink.trim().is_empty() {
            item.link
        } else {
            item.originallink
        };
        RawEntry {
            title,
            description: item.description,
            link,
            source,
            published: item.pub_date,
        }
    }
}

/// Client for the Naver news search endpoint.
pub struct NaverClient {
    client: Client,
    client_id: String,
    client_secret: String,
    base_url: Url,
}

impl NaverClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectError> {
        Self::with_base_url(client_id, client_secret, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`CollectError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CollectError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .and_then(|u| u.join(SEARCH_PATH))
            .map_err(|e| CollectError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            base_url,
        })
    }

    fn build_url(&self, query: &str, start: usize, display: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("display", &display.to_string())
            .append_pair("start", &start.to_string())
            .append_pair("sort", "date");
        url
    }

    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// - [`CollectError::Http`] on network failure.
    /// - [`CollectError::UnexpectedStatus`] on a non-2xx response.
    /// - [`CollectError::Deserialize`] if the body is not the expected JSON.
    pub async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        display: usize,
    ) -> Result<Vec<RawEntry>, CollectError> {
        let url = self.build_url(query, start, display);
        let response = self
            .client
            .get(url.clone())
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact(&url),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| CollectError::Deserialize {
                context: format!("naver search(query={query}, start={start})"),
                source: e,
            })?;

        Ok(parsed.items.into_iter().map(RawEntry::from).collect())
    }

    /// Collect up to `max_fetch` recent items across `queries`.
    ///
    /// Each query is paged newest-first until the page runs dry, an entry
    /// older than the window shows up, the offset limit is reached, or
    /// `max_fetch` items have been accepted. A failed page ends that query
    /// and is counted in the report; it never fails the collection.
    pub async fn collect(
        &self,
        queries: &[String],
        max_fetch: usize,
        window: RecencyWindow,
    ) -> CollectReport {
        let mut intake = Intake::new(Provider::Naver, window, max_fetch, "NAVER");

        for query in queries {
            if intake.is_full() {
                break;
            }
            let mut start = 1;
            while start <= MAX_START && !intake.is_full() {
                let display = intake.remaining().min(MAX_DISPLAY);
                let page = match self.fetch_page(query, start, display).await {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!(query = %query, start, error = %e, "naver page fetch failed");
                        intake.record_failure();
                        break;
                    }
                };

                let page_len = page.len();
                let mut reached_stale = false;
                for entry in page {
                    if intake.offer(entry) == Offer::Stale {
                        reached_stale = true;
                    }
                }

                if reached_stale || page_len < display {
                    break;
                }
                start += display;
            }
        }

        let report = intake.finish();
        tracing::info!(
            provider = "naver",
            collected = report.items.len(),
            stale = report.stale,
            duplicates = report.duplicates,
            unusable = report.unusable,
            failed_requests = report.failed_requests,
            "naver collection finished"
        );
        report
    }
}

/// URL for logs, without the query string.
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}
