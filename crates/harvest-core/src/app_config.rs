use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub categories_path: PathBuf,
    /// Directory holding one `<category>_data.json` store per category.
    pub data_dir: PathBuf,
    pub report_path: PathBuf,
    /// Opaque session-cookie blob, loaded before navigation and rewritten
    /// when a session ends.
    pub cookies_path: PathBuf,
    pub diagnostics_dir: PathBuf,
    pub log_level: String,
    /// Origin that relative product links are resolved against.
    pub site_origin: reqwest::Url,
    pub max_cycles: u32,
    pub load_wait_ms: u64,
    pub expand_dwell_ms: u64,
    pub max_expansions: u32,
    pub max_concurrent_categories: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts for a page fetch that failed transiently.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}
