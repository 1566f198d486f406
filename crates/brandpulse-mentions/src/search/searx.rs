//! SearXNG metasearch over a list of public instances.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::{FetchError, MentionError};
use crate::fetch::browser_client;
use crate::search::html::{EngineProfile, HtmlSearchBackend};
use crate::search::{Engine, SearchBackend};
use crate::types::SearchHit;

/// Engine label on hits served by the built-in fallback.
const FALLBACK_ENGINE_LABEL: &str = "duckduckgo_fallback";

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    engine: Option<String>,
}

/// Queries each instance in turn; when all fail or come back empty, falls
/// back to a DuckDuckGo HTML search.
pub struct SearxBackend {
    client: Client,
    instances: Vec<Url>,
    locale: String,
    fallback: Option<HtmlSearchBackend>,
}

impl SearxBackend {
    /// # Errors
    ///
    /// Returns [`MentionError`] if an HTTP client cannot be built or an
    /// instance URL does not parse.
    pub fn new(instances: &[String], locale: &str, timeout_secs: u64) -> Result<Self, MentionError> {
        let fallback = HtmlSearchBackend::new(EngineProfile::DUCKDUCKGO, timeout_secs)?;
        Self::with_fallback(instances, locale, timeout_secs, Some(fallback))
    }

    /// # Errors
    ///
    /// Returns [`MentionError`] if an HTTP client cannot be built or an
    /// instance URL does not parse.
    pub fn with_fallback(
        instances: &[String],
        locale: &str,
        timeout_secs: u64,
        fallback: Option<HtmlSearchBackend>,
    ) -> Result<Self, MentionError> {
        let instances = instances
            .iter()
            .map(|raw| {
                Url::parse(raw).map_err(|e| MentionError::InvalidBaseUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client: browser_client(Duration::from_secs(timeout_secs))?,
            instances,
            locale: locale.to_string(),
            fallback,
        })
    }

    async fn query_instance(
        &self,
        instance: &Url,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, FetchError> {
        let mut url = instance.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("language", &self.locale);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: SearxResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .filter(|r| !r.url.trim().is_empty())
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content.filter(|c| !c.trim().is_empty()),
                engine: r.engine.unwrap_or_else(|| Engine::Searx.as_str().to_string()),
            })
            .collect())
    }
}

#[async_trait]
impl SearchBackend for SearxBackend {
    fn engine(&self) -> Engine {
        Engine::Searx
    }

    /// One request slot per instance plus one for the fallback.
    fn deadline(&self, per_request: Duration) -> Duration {
        let tiers = self.instances.len() + usize::from(self.fallback.is_some());
        per_request.saturating_mul(u32::try_from(tiers.max(1)).unwrap_or(u32::MAX))
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, FetchError> {
        for instance in &self.instances {
            match self.query_instance(instance, query, max_results).await {
                Ok(hits) if !hits.is_empty() => return Ok(hits),
                Ok(_) => tracing::debug!(instance = %instance, "searx instance returned no results"),
                Err(e) => tracing::debug!(instance = %instance, error = %e, "searx instance failed"),
            }
        }

        let Some(fallback) = &self.fallback else {
            return Ok(Vec::new());
        };
        let mut hits = fallback.search(query, max_results).await?;
        for hit in &mut hits {
            hit.engine = FALLBACK_ENGINE_LABEL.to_string();
        }
        Ok(hits)
    }
}
