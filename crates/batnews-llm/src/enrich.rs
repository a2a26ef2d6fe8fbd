//! Per-item enrichment: a short summary and the companies involved.
//!
//! Each selected item gets one model call, dispatched with bounded
//! concurrency and a per-call timeout. Any failure degrades that item to a
//! local summary built from its description; it never fails the batch.

use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use batnews_core::CandidateItem;
use batnews_rank::extract_entities;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::gemini::{parse_model_json, GeminiClient};
use crate::retry::{retry_with_backoff, RetryPolicy};

pub const MAX_SUMMARY_SENTENCES: usize = 3;
pub const MAX_COMPANIES: usize = 3;
const MAX_SENTENCE_CHARS: usize = 220;

/// What a model returns for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedItem {
    pub summary: Vec<String>,
    pub companies: Vec<String>,
    pub source: EnrichmentSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Calls in flight at once.
    pub concurrency: usize,
    pub timeout: Duration,
}

pub trait Enricher {
    fn enrich(
        &self,
        item: &CandidateItem,
    ) -> impl Future<Output = Result<Enrichment, LlmError>> + Send;
}

/// Gemini-backed [`Enricher`].
#[derive(Debug)]
pub struct GeminiEnricher {
    client: GeminiClient,
    retry: RetryPolicy,
}

impl GeminiEnricher {
    #[must_use]
    pub fn new(client: GeminiClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[must_use]
pub fn enrichment_prompt(item: &CandidateItem) -> String {
    let mut prompt = String::from(
        "Summarize this battery-industry news item for an analyst digest.\n\
         Write exactly three short factual sentences in the language of the headline, \
         and list up to three companies or institutions that the story is about.\n\
         Respond with JSON only, shaped as {\"summary\":[\"...\",\"...\",\"...\"],\"companies\":[\"...\"]}\n\n",
    );
    let _ = writeln!(prompt, "Title: {}", item.title);
    let _ = writeln!(prompt, "Source: {}", item.source);
    if !item.description.is_empty() {
        let _ = writeln!(prompt, "Description: {}", item.description);
    }
    prompt
}

impl Enricher for GeminiEnricher {
    async fn enrich(&self, item: &CandidateItem) -> Result<Enrichment, LlmError> {
        let prompt = enrichment_prompt(item);
        retry_with_backoff(&self.retry, "enrich", || async {
            let text = self.client.generate(&prompt).await?;
            parse_model_json::<Enrichment>(&text, "enrichment reply")
        })
        .await
    }
}

/// Enrich every item, preserving input order.
///
/// With no enricher every item takes the local fallback.
pub async fn enrich_all<E: Enricher>(
    enricher: Option<&E>,
    items: &[CandidateItem],
    options: &EnrichOptions,
) -> Vec<EnrichedItem> {
    let Some(enricher) = enricher else {
        return items.iter().map(fallback_enrichment).collect();
    };

    let results: Vec<EnrichedItem> = stream::iter(items.iter().map(|item| async move {
        match tokio::time::timeout(options.timeout, enricher.enrich(item)).await {
            Ok(Ok(enrichment)) => merge_enrichment(item, enrichment),
            Ok(Err(e)) => {
                tracing::warn!(link = %item.link, error = %e, "enrichment failed, using fallback");
                fallback_enrichment(item)
            }
            Err(_) => {
                tracing::warn!(
                    link = %item.link,
                    timeout_secs = options.timeout.as_secs(),
                    "enrichment timed out, using fallback"
                );
                fallback_enrichment(item)
            }
        }
    }))
    .buffered(options.concurrency.max(1))
    .collect()
    .await;

    let fallbacks = results
        .iter()
        .filter(|r| r.source == EnrichmentSource::Fallback)
        .count();
    tracing::info!(total = results.len(), fallbacks, "enrichment complete");
    results
}

fn merge_enrichment(item: &CandidateItem, enrichment: Enrichment) -> EnrichedItem {
    let summary: Vec<String> = enrichment
        .summary
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_SUMMARY_SENTENCES)
        .map(|s| clip(s, MAX_SENTENCE_CHARS))
        .collect();

    if summary.is_empty() {
        tracing::warn!(link = %item.link, "model returned no summary, using fallback");
        let mut fallback = fallback_enrichment(item);
        fallback.companies = merge_companies(&enrichment.companies, &rule_companies(item));
        return fallback;
    }

    EnrichedItem {
        summary,
        companies: merge_companies(&enrichment.companies, &rule_companies(item)),
        source: EnrichmentSource::Model,
    }
}

/// Local enrichment: leading description sentences and rule-based companies.
#[must_use]
pub fn fallback_enrichment(item: &CandidateItem) -> EnrichedItem {
    let mut summary: Vec<String> = split_sentences(&item.description)
        .into_iter()
        .take(MAX_SUMMARY_SENTENCES)
        .map(|s| clip(s, MAX_SENTENCE_CHARS))
        .collect();
    if summary.is_empty() {
        summary.push(clip(item.title.trim(), MAX_SENTENCE_CHARS));
    }

    EnrichedItem {
        summary,
        companies: merge_companies(&[], &rule_companies(item)),
        source: EnrichmentSource::Fallback,
    }
}

fn rule_companies(item: &CandidateItem) -> Vec<String> {
    let mut names = extract_entities(&item.title);
    names.extend(extract_entities(&item.description));
    names
}

/// Model names first, then rule-based ones; deduplicated case-insensitively,
/// single characters dropped, at most [`MAX_COMPANIES`].
#[must_use]
pub fn merge_companies(model: &[String], rules: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for name in model.iter().chain(rules) {
        let name = name.trim();
        if name.chars().count() < 2 {
            continue;
        }
        if merged.iter().any(|m| m.to_lowercase() == name.to_lowercase()) {
            continue;
        }
        merged.push(name.to_string());
        if merged.len() == MAX_COMPANIES {
            break;
        }
    }
    merged
}

/// Split on `.`, `!`, `?` or `。` followed by whitespace or the end of text.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?' | '。') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn clip(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut clipped: String = s.chars().take(limit - 1).collect();
    clipped.push('…');
    clipped
}
