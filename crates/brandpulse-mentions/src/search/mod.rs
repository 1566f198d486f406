//! Search routing across metasearch and scraped HTML engines.

mod html;
mod searx;

pub use html::{EngineProfile, HtmlSearchBackend};
pub use searx::SearxBackend;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MentionConfig;
use crate::error::{FetchError, MentionError};
use crate::types::SearchHit;

/// Query marker that restricts results to one site.
pub const DIRECTED_MARKER: &str = "site:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Searx,
    DuckDuckGo,
    Bing,
    Baidu,
    Sogou,
    So360,
}

impl Engine {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Searx => "searx",
            Engine::DuckDuckGo => "duckduckgo",
            Engine::Bing => "bing",
            Engine::Baidu => "baidu",
            Engine::Sogou => "sogou",
            Engine::So360 => "so360",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backends for site-restricted queries: engines that honour `site:` well.
pub const DIRECTED_ORDER: &[Engine] = &[
    Engine::Bing,
    Engine::Baidu,
    Engine::Sogou,
    Engine::So360,
    Engine::DuckDuckGo,
];
pub const REGIONAL_ORDER: &[Engine] = &[
    Engine::Baidu,
    Engine::Sogou,
    Engine::So360,
    Engine::Bing,
    Engine::DuckDuckGo,
];
pub const METASEARCH_ORDER: &[Engine] = &[
    Engine::Searx,
    Engine::DuckDuckGo,
    Engine::Bing,
    Engine::Baidu,
];

#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn engine(&self) -> Engine;

    /// How long the router waits for one [`search`](Self::search) call,
    /// given the per-request timeout. Backends that issue several requests
    /// in sequence widen it.
    fn deadline(&self, per_request: Duration) -> Duration {
        per_request
    }

    /// At most `max_results` hits, in engine rank order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, FetchError>;
}

#[must_use]
pub fn is_directed(query: &str) -> bool {
    query.to_lowercase().contains(DIRECTED_MARKER)
}

/// Tries backends in a query-dependent order and returns the first
/// non-empty result list. Backend failures are never surfaced.
pub struct SearchRouter {
    backends: Vec<Arc<dyn SearchBackend>>,
    prefer_regional: bool,
    timeout: Duration,
}

impl SearchRouter {
    #[must_use]
    pub fn new(
        backends: Vec<Arc<dyn SearchBackend>>,
        prefer_regional: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            backends,
            prefer_regional,
            timeout,
        }
    }

    /// Router over the live public engines.
    ///
    /// # Errors
    ///
    /// Returns [`MentionError`] if an HTTP client cannot be constructed.
    pub fn with_default_backends(config: &MentionConfig) -> Result<Self, MentionError> {
        let timeout = config.search_timeout_secs;
        let mut backends: Vec<Arc<dyn SearchBackend>> = vec![Arc::new(SearxBackend::new(
            &config.searxng_instances,
            &config.search_locale(),
            timeout,
        )?)];
        for profile in [
            EngineProfile::DUCKDUCKGO,
            EngineProfile::BING,
            EngineProfile::BAIDU,
            EngineProfile::SOGOU,
            EngineProfile::SO360,
        ] {
            backends.push(Arc::new(HtmlSearchBackend::new(profile, timeout)?));
        }

        Ok(Self::new(
            backends,
            config.prefer_regional,
            Duration::from_secs(timeout),
        ))
    }

    #[must_use]
    pub fn order_for(&self, query: &str) -> &'static [Engine] {
        if is_directed(query) {
            DIRECTED_ORDER
        } else if self.prefer_regional {
            REGIONAL_ORDER
        } else {
            METASEARCH_ORDER
        }
    }

    /// First non-empty hit list along [`order_for`](Self::order_for);
    /// empty when every backend fails or finds nothing.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        for engine in self.order_for(query) {
            let Some(backend) = self.backends.iter().find(|b| b.engine() == *engine) else {
                continue;
            };

            let deadline = backend.deadline(self.timeout);
            match tokio::time::timeout(deadline, backend.search(query, max_results)).await {
                Ok(Ok(hits)) if !hits.is_empty() => {
                    return hits.into_iter().take(max_results).collect();
                }
                Ok(Ok(_)) => {
                    tracing::debug!(engine = %engine, query, "search backend returned no hits");
                }
                Ok(Err(e)) => {
                    tracing::debug!(engine = %engine, query, error = %e, "search backend failed");
                }
                Err(_) => {
                    tracing::debug!(engine = %engine, query, "search backend timed out");
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
