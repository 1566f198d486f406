use brandpulse_core::AppConfig;

/// Characters of a document sent for translation.
pub const TRANSLATE_WINDOW_CHARS: usize = 4000;
/// Extracted text shorter than this counts as a failed extraction tier.
pub const MIN_EXTRACTED_CHARS: usize = 100;

/// Runtime knobs for the retrieval and analysis stages.
///
/// Built from [`AppConfig`] in production; tests construct it directly or via
/// [`Default`], which mirrors the environment defaults.
#[derive(Debug, Clone)]
pub struct MentionConfig {
    pub time_budget_secs: u64,
    pub max_fetches: usize,
    pub max_results: usize,
    pub fetch_concurrency: usize,
    pub prefer_regional: bool,
    pub demo_mode: bool,
    pub target_language: String,
    pub searxng_instances: Vec<String>,
    pub read_proxy_base: String,
    pub search_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub site_fetch_timeout_secs: u64,
    pub dedup_threshold: u32,
    pub translate_window_chars: usize,
    pub min_extracted_chars: usize,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: 25,
            max_fetches: 50,
            max_results: 60,
            fetch_concurrency: 1,
            prefer_regional: true,
            demo_mode: true,
            target_language: "zh".to_string(),
            searxng_instances: Vec::new(),
            read_proxy_base: "https://r.jina.ai".to_string(),
            search_timeout_secs: 15,
            fetch_timeout_secs: 8,
            site_fetch_timeout_secs: 12,
            dedup_threshold: 8,
            translate_window_chars: TRANSLATE_WINDOW_CHARS,
            min_extracted_chars: MIN_EXTRACTED_CHARS,
        }
    }
}

impl MentionConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            time_budget_secs: config.time_budget_secs,
            max_fetches: config.max_fetches,
            max_results: config.max_results,
            fetch_concurrency: config.fetch_concurrency.max(1),
            prefer_regional: config.prefer_regional,
            demo_mode: config.demo_mode,
            target_language: config.target_language.clone(),
            searxng_instances: config.searxng_instances.clone(),
            read_proxy_base: config.read_proxy_base.clone(),
            search_timeout_secs: config.search_timeout_secs,
            fetch_timeout_secs: config.fetch_timeout_secs,
            site_fetch_timeout_secs: config.site_fetch_timeout_secs,
            dedup_threshold: config.dedup_threshold,
            ..Self::default()
        }
    }

    /// Locale tag sent to metasearch instances, e.g. `zh` becomes `zh-CN`.
    #[must_use]
    pub fn search_locale(&self) -> String {
        match self.target_language.as_str() {
            "zh" => "zh-CN".to_string(),
            "en" => "en-US".to_string(),
            other => other.to_string(),
        }
    }
}
