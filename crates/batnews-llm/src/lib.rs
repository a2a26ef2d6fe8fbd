//! Generative-model integration: headline classification and per-item
//! enrichment over the Gemini API, with retries and local fallbacks.

pub mod classify;
pub mod enrich;
pub mod error;
pub mod gemini;
pub mod retry;

pub use classify::{
    classifier_prompt, classify_titles, parse_classifier_reply, Classifier, ClassifyOptions,
    GeminiClassifier,
};
pub use enrich::{
    enrich_all, fallback_enrichment, merge_companies, split_sentences, EnrichOptions,
    EnrichedItem, Enricher, Enrichment, EnrichmentSource, GeminiEnricher,
};
pub use error::LlmError;
pub use gemini::{extract_json_object, parse_model_json, GeminiClient};
pub use retry::{is_retriable, retry_with_backoff, RetryPolicy};
