use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.categories_path, PathBuf::from("./config/categories.yaml"));
    assert_eq!(cfg.data_dir, PathBuf::from("./data"));
    assert_eq!(
        cfg.report_path,
        PathBuf::from("./data/checked_combined_data.json")
    );
    assert_eq!(cfg.cookies_path, PathBuf::from("./cookies_raw.json"));
    assert_eq!(cfg.diagnostics_dir, PathBuf::from("./diagnostics"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.site_origin.as_str(), "https://shop-id.tokopedia.com/");
    assert_eq!(cfg.max_cycles, 5);
    assert_eq!(cfg.load_wait_ms, 5000);
    assert_eq!(cfg.expand_dwell_ms, 3000);
    assert_eq!(cfg.max_expansions, 500);
    assert_eq!(cfg.max_concurrent_categories, 1);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.backoff_base_secs, 1);
}

#[test]
fn max_cycles_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_CYCLES", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_cycles, 2);
}

#[test]
fn max_cycles_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_CYCLES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_MAX_CYCLES"),
        "expected InvalidEnvVar(HARVEST_MAX_CYCLES), got: {result:?}"
    );
}

#[test]
fn max_cycles_invalid() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_CYCLES", "five");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_MAX_CYCLES"),
        "expected InvalidEnvVar(HARVEST_MAX_CYCLES), got: {result:?}"
    );
}

#[test]
fn expand_dwell_ms_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_EXPAND_DWELL_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.expand_dwell_ms, 250);
}

#[test]
fn load_wait_ms_invalid() {
    let mut map = HashMap::new();
    map.insert("HARVEST_LOAD_WAIT_MS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_LOAD_WAIT_MS"),
        "expected InvalidEnvVar(HARVEST_LOAD_WAIT_MS), got: {result:?}"
    );
}

#[test]
fn max_concurrent_categories_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_CONCURRENT_CATEGORIES", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_categories, 2);
}

#[test]
fn max_expansions_invalid() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_EXPANSIONS", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_MAX_EXPANSIONS"),
        "expected InvalidEnvVar(HARVEST_MAX_EXPANSIONS), got: {result:?}"
    );
}

#[test]
fn site_origin_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_SITE_ORIGIN", "https://shop.example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.site_origin.host_str(), Some("shop.example.com"));
}

#[test]
fn site_origin_rejects_non_url() {
    let mut map = HashMap::new();
    map.insert("HARVEST_SITE_ORIGIN", "shop.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_SITE_ORIGIN"),
        "expected InvalidEnvVar(HARVEST_SITE_ORIGIN), got: {result:?}"
    );
}

#[test]
fn site_origin_rejects_non_http_scheme() {
    let mut map = HashMap::new();
    map.insert("HARVEST_SITE_ORIGIN", "mailto:shop@example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_SITE_ORIGIN"),
        "expected InvalidEnvVar(HARVEST_SITE_ORIGIN), got: {result:?}"
    );
}

#[test]
fn path_overrides() {
    let mut map = HashMap::new();
    map.insert("HARVEST_DATA_DIR", "/var/lib/harvest");
    map.insert("HARVEST_COOKIES_PATH", "/etc/harvest/cookies.json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/harvest"));
    assert_eq!(cfg.cookies_path, PathBuf::from("/etc/harvest/cookies.json"));
}

#[test]
fn user_agent_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}

#[test]
fn retry_settings_override() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_RETRIES", "0");
    map.insert("HARVEST_BACKOFF_BASE_SECS", "4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.backoff_base_secs, 4);
}

#[test]
fn max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("HARVEST_MAX_RETRIES", "-3");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARVEST_MAX_RETRIES"),
        "expected InvalidEnvVar(HARVEST_MAX_RETRIES), got: {result:?}"
    );
}
