use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_NAVER_QUERIES: &str =
    "배터리 2차전지,전고체 배터리,나트륨이온 배터리,배터리 재활용 블랙매스,양극재 전구체 LFP NCM,음극재 흑연 실리콘,전해질 첨가제,분리막,ESS 배터리,배터리 관세 IRA";

const DEFAULT_GOOGLE_QUERIES: &str = "battery (cathode OR anode OR electrolyte OR separator OR solid-state OR sodium-ion OR recycling);\
battery (gigafactory OR plant OR production OR capacity OR investment OR supply agreement);\
battery (policy OR regulation OR subsidy OR tariff OR IRA OR CBAM)";

const DEFAULT_NAVER_BASE_URL: &str = "https://openapi.naver.com";

const DEFAULT_GOOGLE_NEWS_BASE_URL: &str = "https://news.google.com";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; credentials are optional and their absence
/// disables the matching provider or classifier for the run.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
#[allow(clippy::too_many_lines)]
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_usize(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let parse_ratio = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(var, format!("{value} is outside 0.0..=1.0")));
        }
        Ok(value)
    };

    let parse_score = |var: &str, default: &str| -> Result<u8, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value > 100 {
            return Err(invalid(var, format!("{value} is outside 0..=100")));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(invalid(var, format!("'{other}' is not a boolean"))),
        }
    };

    let log_level = or_default("BATNEWS_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default("BATNEWS_SOURCES_PATH", "./config/sources.yaml"));
    let output_dir = PathBuf::from(or_default("BATNEWS_OUTPUT_DIR", "./outputs"));

    let naver_client_id = optional("NAVER_CLIENT_ID");
    let naver_client_secret = optional("NAVER_CLIENT_SECRET");
    let naver_base_url = or_default("NAVER_BASE_URL", DEFAULT_NAVER_BASE_URL);
    let naver_queries = split_list(&or_default("NAVER_QUERIES", DEFAULT_NAVER_QUERIES), ',');
    let naver_fetch_n = parse_positive("NAVER_FETCH_N", "150")?;
    let naver_count = parse_usize("NAVER_COUNT", "10")?;

    let google_news_base_url = or_default("GOOGLE_NEWS_BASE_URL", DEFAULT_GOOGLE_NEWS_BASE_URL);
    let google_queries = split_list(&or_default("GOOGLE_QUERIES", DEFAULT_GOOGLE_QUERIES), ';');
    let google_fetch_n = parse_positive("GOOGLE_FETCH_N", "150")?;
    let google_count = parse_usize("GOOGLE_COUNT", "10")?;

    let window_hours = parse_u32("BATNEWS_WINDOW_HOURS", "24")?;
    if window_hours == 0 {
        return Err(invalid("BATNEWS_WINDOW_HOURS", "must be at least 1".to_string()));
    }
    let min_items = parse_usize("MIN_ITEMS", "10")?;
    let max_items = parse_positive("MAX_ITEMS", "20")?;
    let pool_providers = parse_bool("BATNEWS_POOL_PROVIDERS", "false")?;

    let dedupe_threshold = parse_ratio("BATNEWS_DEDUPE_THRESHOLD", "0.88")?;
    let near_duplicate_threshold = parse_ratio("BATNEWS_NEAR_DUP_THRESHOLD", "0.75")?;
    let relevance_min = parse_score("BATTERY_RELEVANCE_MIN", "55")?;
    let default_relevance = parse_score("BATNEWS_DEFAULT_RELEVANCE", "60")?;
    let entity_cap = parse_positive("BATNEWS_ENTITY_CAP", "2")?;
    let topic_cap = parse_positive("BATNEWS_TOPIC_CAP", "3")?;

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("GEMINI_MODEL", "gemini-2.5-flash-lite");
    let gemini_base_url = or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
    let llm_retries = parse_u32("LLM_RETRIES", "0")?;
    let llm_backoff_base_ms = parse_u64("LLM_BACKOFF_BASE_MS", "1000")?;
    let llm_backoff_max_ms = parse_u64("LLM_BACKOFF_MAX_MS", "6000")?;
    let llm_chunk_size = parse_positive("LLM_CHUNK_SIZE", "40")?;
    let llm_title_limit = parse_positive("LLM_TITLE_LIMIT", "300")?;
    let enrich_concurrency = parse_positive("ENRICH_CONCURRENCY", "4")?;
    let enrich_timeout_secs = parse_u64("ENRICH_TIMEOUT_SECS", "30")?;

    let http_timeout_secs = parse_u64("HTTP_TIMEOUT_SECS", "20")?;
    let http_user_agent = or_default("HTTP_USER_AGENT", "batnews/0.1 (battery-news-digest)");

    Ok(AppConfig {
        log_level,
        sources_path,
        output_dir,
        naver_client_id,
        naver_client_secret,
        naver_base_url,
        naver_queries,
        naver_fetch_n,
        naver_count,
        google_news_base_url,
        google_queries,
        google_fetch_n,
        google_count,
        window_hours,
        min_items,
        max_items,
        pool_providers,
        dedupe_threshold,
        near_duplicate_threshold,
        relevance_min,
        default_relevance,
        entity_cap,
        topic_cap,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        llm_retries,
        llm_backoff_base_ms,
        llm_backoff_max_ms,
        llm_chunk_size,
        llm_title_limit,
        enrich_concurrency,
        enrich_timeout_secs,
        http_timeout_secs,
        http_user_agent,
    })
}

/// Split a delimited env value into trimmed, non-empty entries.
fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
