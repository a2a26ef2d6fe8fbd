//! Batch headline classification: event keys plus relevance and importance.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::future::Future;

use batnews_rank::{ClassifierResult, RawVerdict, Verdict};
use serde::Deserialize;

use crate::error::LlmError;
use crate::gemini::{parse_model_json, GeminiClient};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Something that can assign event keys and scores to a batch of headlines.
///
/// The returned result must be sized to `titles`; missing entries are
/// allowed and handled downstream by the heuristic fallback.
pub trait Classifier {
    fn classify(
        &self,
        titles: &[String],
    ) -> impl Future<Output = Result<ClassifierResult, LlmError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Largest batch sent in a single call.
    pub chunk_size: usize,
    /// Titles are cut to this many characters before sending.
    pub title_limit: usize,
}

#[derive(Deserialize)]
struct ClassifierPayload {
    #[serde(default)]
    items: Vec<RawVerdict>,
}

/// Build the classification prompt for an ordered list of titles.
#[must_use]
pub fn classifier_prompt(titles: &[String]) -> String {
    let mut prompt = String::from(
        "You triage battery-industry news headlines for a daily monitoring digest.\n\
         For every headline below return one entry with:\n\
         - index: the headline number as given\n\
         - event_key: a short lowercase slug naming the underlying real-world event; \
           headlines reporting the same event MUST share the same event_key\n\
         - battery_relevance: 0-100, how directly the story concerns batteries \
           (cells, materials, recycling, equipment, ESS, battery policy)\n\
         - monitoring_importance: 0-100, how much an industry analyst needs to know it \
           (investment, capacity, supply contracts, M&A, regulation, earnings rank high)\n\
         Respond with JSON only, shaped as \
         {\"items\":[{\"index\":0,\"event_key\":\"...\",\"battery_relevance\":0,\"monitoring_importance\":0}]}\n\n\
         Headlines:\n",
    );
    for (i, title) in titles.iter().enumerate() {
        let _ = writeln!(prompt, "{i}. {title}");
    }
    prompt
}

/// Parse a classifier reply for a batch of `n` titles.
///
/// # Errors
///
/// Returns [`LlmError::MissingJson`] or [`LlmError::Deserialize`] when the
/// reply does not contain the expected object.
pub fn parse_classifier_reply(text: &str, n: usize) -> Result<ClassifierResult, LlmError> {
    let payload: ClassifierPayload = parse_model_json(text, "classifier reply")?;
    Ok(ClassifierResult::from_entries(n, payload.items))
}

/// Gemini-backed [`Classifier`] with retries.
#[derive(Debug)]
pub struct GeminiClassifier {
    client: GeminiClient,
    retry: RetryPolicy,
}

impl GeminiClassifier {
    #[must_use]
    pub fn new(client: GeminiClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

impl Classifier for GeminiClassifier {
    async fn classify(&self, titles: &[String]) -> Result<ClassifierResult, LlmError> {
        let prompt = classifier_prompt(titles);
        retry_with_backoff(&self.retry, "classify", || async {
            let text = self.client.generate(&prompt).await?;
            parse_classifier_reply(&text, titles.len())
        })
        .await
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Classify `titles`, chunking large batches.
///
/// Batches up to `chunk_size` go out in one call. Larger batches are
/// classified chunk by chunk, then each chunk's representatives (one per
/// chunk-local event) are classified together so duplicates that landed in
/// different chunks end up with one key. Scores always come from the first
/// pass.
///
/// Returns `None` when there is nothing worth classifying (fewer than two
/// titles) or when every call failed. Failures are logged, never returned.
pub async fn classify_titles<C: Classifier>(
    classifier: &C,
    titles: &[String],
    options: &ClassifyOptions,
) -> Option<ClassifierResult> {
    if titles.len() < 2 {
        return None;
    }
    let titles: Vec<String> = titles
        .iter()
        .map(|t| truncate_chars(t, options.title_limit))
        .collect();
    let chunk_size = options.chunk_size.max(1);

    if titles.len() <= chunk_size {
        return match classifier.classify(&titles).await {
            Ok(result) => {
                log_coverage(&result);
                Some(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, count = titles.len(), "classification failed, using heuristic scores");
                None
            }
        };
    }

    let mut verdicts: Vec<Option<Verdict>> = vec![None; titles.len()];
    let mut any_chunk_ok = false;

    for (chunk_no, chunk) in titles.chunks(chunk_size).enumerate() {
        let offset = chunk_no * chunk_size;
        match classifier.classify(chunk).await {
            Ok(result) => {
                any_chunk_ok = true;
                for (local, verdict) in result.into_verdicts().into_iter().enumerate() {
                    if let (Some(mut v), Some(slot)) = (verdict, verdicts.get_mut(offset + local)) {
                        v.event_key = format!("c{chunk_no}:{}", v.event_key);
                        *slot = Some(v);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(chunk = chunk_no, error = %e, "chunk classification failed");
            }
        }
    }

    if !any_chunk_ok {
        tracing::warn!(count = titles.len(), "all classification chunks failed, using heuristic scores");
        return None;
    }

    merge_across_chunks(classifier, &titles, &mut verdicts).await;
    let result = ClassifierResult::from_verdicts(verdicts);
    log_coverage(&result);
    Some(result)
}

/// Second pass: classify one representative per chunk-local key and rewrite
/// keys so cross-chunk duplicates share one.
async fn merge_across_chunks<C: Classifier>(
    classifier: &C,
    titles: &[String],
    verdicts: &mut [Option<Verdict>],
) {
    let mut best: HashMap<&str, (Reverse<u8>, Reverse<u8>, usize)> = HashMap::new();
    for (i, verdict) in verdicts.iter().enumerate() {
        let Some(v) = verdict else { continue };
        let key = representative_key(v, i);
        best.entry(v.event_key.as_str())
            .and_modify(|cur| {
                if key < *cur {
                    *cur = key;
                }
            })
            .or_insert(key);
    }

    let mut reps: Vec<(String, usize)> = best
        .into_iter()
        .map(|(k, (_, _, i))| (k.to_string(), i))
        .collect();
    if reps.len() < 2 {
        return;
    }
    reps.sort_by_key(|(_, i)| *i);

    let rep_titles: Vec<String> = reps.iter().map(|(_, i)| titles[*i].clone()).collect();
    let merged = match classifier.classify(&rep_titles).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "cross-chunk merge failed, keeping per-chunk event keys");
            return;
        }
    };

    let renames: HashMap<String, String> = reps
        .iter()
        .enumerate()
        .filter_map(|(pos, (local_key, _))| {
            merged
                .get(pos)
                .map(|v| (local_key.clone(), format!("g:{}", v.event_key)))
        })
        .collect();

    for v in verdicts.iter_mut().flatten() {
        if let Some(global) = renames.get(&v.event_key) {
            v.event_key.clone_from(global);
        }
    }

    let mut groups: Vec<&str> = renames.values().map(String::as_str).collect();
    groups.sort_unstable();
    groups.dedup();
    tracing::debug!(
        local_events = reps.len(),
        merged_events = groups.len(),
        "merged chunk-local events"
    );
}

fn log_coverage(result: &ClassifierResult) {
    let missing = result.missing_count();
    if missing > 0 {
        tracing::warn!(
            missing,
            total = result.len(),
            "classifier omitted some headlines, scoring them heuristically"
        );
    }
}

/// Highest importance, then relevance, then earliest index.
fn representative_key(v: &Verdict, index: usize) -> (Reverse<u8>, Reverse<u8>, usize) {
    (Reverse(v.importance), Reverse(v.relevance), index)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
