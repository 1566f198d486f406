use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings resolved once at startup.
///
/// Components never read the environment themselves; they receive the values
/// they need from this struct.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub default_brand: String,
    pub window_days: u32,
    pub time_budget_secs: u64,
    pub max_fetches: usize,
    pub max_results: usize,
    pub fetch_concurrency: usize,
    pub expand_keywords: bool,
    pub prefer_regional: bool,
    pub demo_mode: bool,
    pub target_language: String,
    pub searxng_instances: Vec<String>,
    pub read_proxy_base: String,
    pub search_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub site_fetch_timeout_secs: u64,
    pub dedup_threshold: u32,
    pub profile_path: Option<PathBuf>,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("default_brand", &self.default_brand)
            .field("window_days", &self.window_days)
            .field("time_budget_secs", &self.time_budget_secs)
            .field("max_fetches", &self.max_fetches)
            .field("max_results", &self.max_results)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("expand_keywords", &self.expand_keywords)
            .field("prefer_regional", &self.prefer_regional)
            .field("demo_mode", &self.demo_mode)
            .field("target_language", &self.target_language)
            .field("searxng_instances", &self.searxng_instances)
            .field("read_proxy_base", &self.read_proxy_base)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("site_fetch_timeout_secs", &self.site_fetch_timeout_secs)
            .field("dedup_threshold", &self.dedup_threshold)
            .field("profile_path", &self.profile_path)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}
