use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sources_path: PathBuf,
    pub output_dir: PathBuf,

    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub naver_base_url: String,
    pub naver_queries: Vec<String>,
    pub naver_fetch_n: usize,
    pub naver_count: usize,

    pub google_news_base_url: String,
    pub google_queries: Vec<String>,
    pub google_fetch_n: usize,
    pub google_count: usize,

    pub window_hours: u32,
    pub min_items: usize,
    pub max_items: usize,
    pub pool_providers: bool,

    pub dedupe_threshold: f64,
    pub near_duplicate_threshold: f64,
    pub relevance_min: u8,
    pub default_relevance: u8,
    pub entity_cap: usize,
    pub topic_cap: usize,

    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_retries: u32,
    pub llm_backoff_base_ms: u64,
    pub llm_backoff_max_ms: u64,
    pub llm_chunk_size: usize,
    pub llm_title_limit: usize,
    pub enrich_concurrency: usize,
    pub enrich_timeout_secs: u64,

    pub http_timeout_secs: u64,
    pub http_user_agent: String,
}

impl AppConfig {
    /// Naver credentials, only when both halves are configured.
    #[must_use]
    pub fn naver_credentials(&self) -> Option<(&str, &str)> {
        match (&self.naver_client_id, &self.naver_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("output_dir", &self.output_dir)
            .field(
                "naver_client_id",
                &self.naver_client_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "naver_client_secret",
                &self.naver_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("naver_base_url", &self.naver_base_url)
            .field("naver_queries", &self.naver_queries)
            .field("naver_fetch_n", &self.naver_fetch_n)
            .field("naver_count", &self.naver_count)
            .field("google_news_base_url", &self.google_news_base_url)
            .field("google_queries", &self.google_queries)
            .field("google_fetch_n", &self.google_fetch_n)
            .field("google_count", &self.google_count)
            .field("window_hours", &self.window_hours)
            .field("min_items", &self.min_items)
            .field("max_items", &self.max_items)
            .field("pool_providers", &self.pool_providers)
            .field("dedupe_threshold", &self.dedupe_threshold)
            .field("near_duplicate_threshold", &self.near_duplicate_threshold)
            .field("relevance_min", &self.relevance_min)
            .field("default_relevance", &self.default_relevance)
            .field("entity_cap", &self.entity_cap)
            .field("topic_cap", &self.topic_cap)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("llm_retries", &self.llm_retries)
            .field("llm_backoff_base_ms", &self.llm_backoff_base_ms)
            .field("llm_backoff_max_ms", &self.llm_backoff_max_ms)
            .field("llm_chunk_size", &self.llm_chunk_size)
            .field("llm_title_limit", &self.llm_title_limit)
            .field("enrich_concurrency", &self.enrich_concurrency)
            .field("enrich_timeout_secs", &self.enrich_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .finish()
    }
}
