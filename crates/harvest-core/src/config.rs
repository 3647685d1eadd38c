use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

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
/// Every variable has a default, so an empty environment yields a usable
/// config. Decoupled from the process environment so tests can use a plain
/// `HashMap` lookup.
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

    let categories_path = PathBuf::from(or_default(
        "HARVEST_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));
    let data_dir = PathBuf::from(or_default("HARVEST_DATA_DIR", "./data"));
    let report_path = PathBuf::from(or_default(
        "HARVEST_REPORT_PATH",
        "./data/checked_combined_data.json",
    ));
    let cookies_path = PathBuf::from(or_default("HARVEST_COOKIES_PATH", "./cookies_raw.json"));
    let diagnostics_dir = PathBuf::from(or_default("HARVEST_DIAGNOSTICS_DIR", "./diagnostics"));
    let log_level = or_default("HARVEST_LOG_LEVEL", "info");

    let site_origin = parse_origin(&or_default(
        "HARVEST_SITE_ORIGIN",
        "https://shop-id.tokopedia.com",
    ))?;

    let max_cycles = parse_u32("HARVEST_MAX_CYCLES", "5")?;
    if max_cycles == 0 {
        return Err(invalid("HARVEST_MAX_CYCLES", "must be at least 1".to_string()));
    }

    let load_wait_ms = parse_u64("HARVEST_LOAD_WAIT_MS", "5000")?;
    let expand_dwell_ms = parse_u64("HARVEST_EXPAND_DWELL_MS", "3000")?;
    let max_expansions = parse_u32("HARVEST_MAX_EXPANSIONS", "500")?;
    let max_concurrent_categories = parse_usize("HARVEST_MAX_CONCURRENT_CATEGORIES", "1")?;
    let request_timeout_secs = parse_u64("HARVEST_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("HARVEST_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("HARVEST_MAX_RETRIES", "2")?;
    let backoff_base_secs = parse_u64("HARVEST_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        categories_path,
        data_dir,
        report_path,
        cookies_path,
        diagnostics_dir,
        log_level,
        site_origin,
        max_cycles,
        load_wait_ms,
        expand_dwell_ms,
        max_expansions,
        max_concurrent_categories,
        request_timeout_secs,
        user_agent,
        max_retries,
        backoff_base_secs,
    })
}

/// Parse the site origin, rejecting anything that cannot act as a join base.
fn parse_origin(raw: &str) -> Result<reqwest::Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "HARVEST_SITE_ORIGIN".to_string(),
        reason,
    };

    let url = reqwest::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("\"{raw}\" is not an http(s) origin")));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
