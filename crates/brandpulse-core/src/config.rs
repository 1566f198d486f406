use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_SEARXNG_INSTANCES: &str =
    "https://searx.tiekoetter.com/search,https://searxng.site/search,https://searx.juancarra.cc/search";
const DEFAULT_LLM_API_URL: &str = "https://ark.cn-beijing.volces.com/api/v3/chat/completions";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false/1/0/yes/no, got \"{raw}\""))
            }),
            Err(_) => Ok(default),
        }
    };

    let env = parse_environment(&or_default("BRANDPULSE_ENV", "development"))?;
    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");
    let default_brand = or_default("BRANDPULSE_DEFAULT_BRAND", "vivo");
    let window_days = parse_u32("BRANDPULSE_WINDOW_DAYS", "60")?;

    let time_budget_secs = parse_u64("BRANDPULSE_TIME_BUDGET_SECS", "25")?;
    let max_fetches = parse_usize("BRANDPULSE_MAX_FETCHES", "50")?;
    let max_results = parse_usize("BRANDPULSE_MAX_RESULTS", "60")?;
    let fetch_concurrency = parse_usize("BRANDPULSE_FETCH_CONCURRENCY", "1")?;
    if fetch_concurrency == 0 {
        return Err(invalid(
            "BRANDPULSE_FETCH_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let expand_keywords = parse_flag("BRANDPULSE_EXPAND_KEYWORDS", true)?;
    let prefer_regional = parse_flag("BRANDPULSE_PREFER_REGIONAL", true)?;
    let demo_mode = parse_flag("BRANDPULSE_DEMO_MODE", true)?;
    let target_language = or_default("BRANDPULSE_TARGET_LANGUAGE", "zh");

    let searxng_instances: Vec<String> =
        or_default("BRANDPULSE_SEARXNG_INSTANCES", DEFAULT_SEARXNG_INSTANCES)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    let read_proxy_base = or_default("BRANDPULSE_READ_PROXY_BASE", "https://r.jina.ai");

    let search_timeout_secs = parse_u64("BRANDPULSE_SEARCH_TIMEOUT_SECS", "15")?;
    let fetch_timeout_secs = parse_u64("BRANDPULSE_FETCH_TIMEOUT_SECS", "8")?;
    let site_fetch_timeout_secs = parse_u64("BRANDPULSE_SITE_FETCH_TIMEOUT_SECS", "12")?;
    let dedup_threshold = parse_u32("BRANDPULSE_DEDUP_THRESHOLD", "8")?;
    if dedup_threshold > 64 {
        return Err(invalid(
            "BRANDPULSE_DEDUP_THRESHOLD",
            "must be between 0 and 64".to_string(),
        ));
    }

    let profile_path = lookup("BRANDPULSE_PROFILE_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let llm_api_key = lookup("LLM_API_KEY").ok().filter(|s| !s.trim().is_empty());
    let llm_api_url = or_default("LLM_API_URL", DEFAULT_LLM_API_URL);
    let llm_model = or_default("LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("LLM_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        env,
        log_level,
        default_brand,
        window_days,
        time_budget_secs,
        max_fetches,
        max_results,
        fetch_concurrency,
        expand_keywords,
        prefer_regional,
        demo_mode,
        target_language,
        searxng_instances,
        read_proxy_base,
        search_timeout_secs,
        fetch_timeout_secs,
        site_fetch_timeout_secs,
        dedup_threshold,
        profile_path,
        llm_api_key,
        llm_api_url,
        llm_model,
        llm_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDPULSE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
