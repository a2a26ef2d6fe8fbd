//! The daily run: collect, rank per provider (or pooled), merge, enrich.
//!
//! Provider and model failures never abort a run. A provider that cannot be
//! queried contributes nothing, a classifier that fails leaves scoring to the
//! keyword heuristics, and enrichment falls back per item.

pub(crate) mod merge;

use std::time::Duration;

use batnews_collect::{GoogleNewsClient, NaverClient, ProviderOutcome, RecencyWindow};
use batnews_core::{AppConfig, CandidateItem, Provider, SourcesFile};
use batnews_llm::{
    classify_titles, enrich_all, Classifier, ClassifyOptions, EnrichOptions, EnrichedItem,
    GeminiClassifier, GeminiClient, GeminiEnricher, RetryPolicy,
};
use batnews_rank::{
    group_events, rank_and_select, resolve_scores, FallbackPolicy, RankedSelection,
    SelectionParams,
};
use chrono::{DateTime, FixedOffset};

use merge::{finalize, merge_providers, DigestItem, ProviderPicks};

/// Model-backed helpers, present only when an API key is configured.
pub(crate) struct ModelClients {
    pub classifier: GeminiClassifier,
    pub enricher: GeminiEnricher,
}

impl ModelClients {
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.gemini_api_key.as_deref() else {
            tracing::warn!("GEMINI_API_KEY not set, using heuristic scores and local summaries");
            return Ok(None);
        };
        let retry = retry_policy(config);
        let build = || {
            GeminiClient::with_base_url(
                api_key,
                &config.gemini_model,
                config.http_timeout_secs,
                &config.gemini_base_url,
            )
        };
        Ok(Some(Self {
            classifier: GeminiClassifier::new(build()?, retry),
            enricher: GeminiEnricher::new(build()?, retry),
        }))
    }
}

fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.llm_retries,
        backoff_base_ms: config.llm_backoff_base_ms,
        backoff_max_ms: config.llm_backoff_max_ms,
    }
}

fn selection_params(config: &AppConfig, top_k: usize) -> SelectionParams {
    SelectionParams {
        top_k,
        relevance_floor: config.relevance_min,
        near_duplicate_threshold: config.near_duplicate_threshold,
        entity_cap: config.entity_cap,
        topic_cap: config.topic_cap,
    }
}

fn classify_options(config: &AppConfig) -> ClassifyOptions {
    ClassifyOptions {
        chunk_size: config.llm_chunk_size,
        title_limit: config.llm_title_limit,
    }
}

fn enrich_options(config: &AppConfig) -> EnrichOptions {
    EnrichOptions {
        concurrency: config.enrich_concurrency,
        timeout: Duration::from_secs(config.enrich_timeout_secs),
    }
}

/// Collect from one provider, or skip it when it cannot be queried.
pub(crate) async fn collect_provider(
    config: &AppConfig,
    provider: Provider,
    window: RecencyWindow,
) -> ProviderOutcome {
    let outcome = match provider {
        Provider::Naver => {
            let Some((id, secret)) = config.naver_credentials() else {
                return skipped(provider, "NAVER_CLIENT_ID/NAVER_CLIENT_SECRET not set");
            };
            let client = NaverClient::with_base_url(
                id,
                secret,
                config.http_timeout_secs,
                &config.http_user_agent,
                &config.naver_base_url,
            );
            match client {
                Ok(client) => ProviderOutcome::Collected(
                    client
                        .collect(&config.naver_queries, config.naver_fetch_n, window)
                        .await,
                ),
                Err(e) => return skipped(provider, &e.to_string()),
            }
        }
        Provider::Google => {
            let client = GoogleNewsClient::with_base_url(
                config.http_timeout_secs,
                &config.http_user_agent,
                &config.google_news_base_url,
            );
            match client {
                Ok(client) => ProviderOutcome::Collected(
                    client
                        .collect(&config.google_queries, config.google_fetch_n, window)
                        .await,
                ),
                Err(e) => return skipped(provider, &e.to_string()),
            }
        }
    };

    if let ProviderOutcome::Collected(report) = &outcome {
        tracing::info!(
            provider = %provider,
            count = report.items.len(),
            stale = report.stale,
            duplicates = report.duplicates,
            failed_requests = report.failed_requests,
            "collection finished"
        );
    }
    outcome
}

fn skipped(provider: Provider, reason: &str) -> ProviderOutcome {
    tracing::warn!(provider = %provider, reason, "skipping provider");
    ProviderOutcome::Skipped {
        reason: reason.to_string(),
    }
}

/// Classify, group and select up to `top_k` items from one candidate pool.
pub(crate) async fn rank_pool<C: Classifier>(
    config: &AppConfig,
    classifier: Option<&C>,
    candidates: &[CandidateItem],
    top_k: usize,
) -> RankedSelection {
    let titles: Vec<String> = candidates.iter().map(|c| c.title.clone()).collect();
    let result = match classifier {
        Some(classifier) => classify_titles(classifier, &titles, &classify_options(config)).await,
        None => None,
    };

    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let policy = FallbackPolicy {
        default_relevance: config.default_relevance,
    };
    let scores = resolve_scores(&title_refs, result.as_ref(), &policy);
    let groups = group_events(candidates, &scores, result.as_ref(), config.dedupe_threshold);
    let selection = rank_and_select(candidates, &groups, &selection_params(config, top_k));

    tracing::info!(
        candidates = candidates.len(),
        groups = groups.len(),
        selected = selection.len(),
        classified = result.is_some(),
        "ranked candidate pool"
    );
    selection
}

/// The run's output: the digest in final order and one enrichment per item.
pub(crate) struct DailyDigest {
    pub items: Vec<DigestItem>,
    pub enrichments: Vec<EnrichedItem>,
}

/// Run the full pipeline for the window ending at `now`.
///
/// # Errors
///
/// Returns an error only for setup failures (HTTP clients that cannot be
/// built). Provider and model failures degrade the result instead.
pub(crate) async fn run_daily(
    config: &AppConfig,
    sources: &SourcesFile,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<DailyDigest> {
    let window = RecencyWindow {
        now,
        hours: config.window_hours,
    };
    let models = ModelClients::from_config(config)?;
    let classifier = models.as_ref().map(|m| &m.classifier);

    let (naver, google) = tokio::join!(
        collect_provider(config, Provider::Naver, window),
        collect_provider(config, Provider::Google, window),
    );
    let naver = naver.into_items();
    let google = google.into_items();

    let selected = if config.pool_providers {
        let mut pooled = naver;
        pooled.extend(google);
        rank_pool(config, classifier, &pooled, config.max_items)
            .await
            .items
    } else {
        let (naver_ranked, google_ranked) = tokio::join!(
            rank_pool(config, classifier, &naver, config.max_items),
            rank_pool(config, classifier, &google, config.max_items),
        );
        merge_providers(
            &ProviderPicks {
                provider: Provider::Naver,
                quota: config.naver_count,
                ranked: naver_ranked.items,
            },
            &ProviderPicks {
                provider: Provider::Google,
                quota: config.google_count,
                ranked: google_ranked.items,
            },
            config.dedupe_threshold,
            &selection_params(config, config.max_items),
        )
    };

    let items = finalize(selected, sources, config.min_items, config.max_items);
    let candidates: Vec<CandidateItem> = items.iter().map(|d| d.item.candidate.clone()).collect();
    let enricher = models.as_ref().map(|m| &m.enricher);
    let enrichments = enrich_all(enricher, &candidates, &enrich_options(config)).await;

    tracing::info!(count = items.len(), "daily digest ready");
    Ok(DailyDigest { items, enrichments })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
