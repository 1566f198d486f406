//! Search engines scraped from their HTML result pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};

use crate::error::{FetchError, MentionError};
use crate::fetch::browser_client;
use crate::search::{Engine, SearchBackend};
use crate::text::element_text;
use crate::types::SearchHit;

/// Where an engine lives and how to read its result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineProfile {
    pub engine: Engine,
    pub endpoint: &'static str,
    /// Query-string parameter carrying the search terms.
    pub query_param: &'static str,
    /// Selector list matching result title anchors.
    pub selectors: &'static str,
}

impl EngineProfile {
    pub const DUCKDUCKGO: Self = Self {
        engine: Engine::DuckDuckGo,
        endpoint: "https://duckduckgo.com/html/",
        query_param: "q",
        selectors: ".result__a",
    };
    pub const BING: Self = Self {
        engine: Engine::Bing,
        endpoint: "https://www.bing.com/search",
        query_param: "q",
        selectors: "li.b_algo h2 a",
    };
    pub const BAIDU: Self = Self {
        engine: Engine::Baidu,
        endpoint: "https://www.baidu.com/s",
        query_param: "wd",
        selectors: "h3 a, .result h3 a, .c-container h3 a",
    };
    pub const SOGOU: Self = Self {
        engine: Engine::Sogou,
        endpoint: "https://www.sogou.com/web",
        query_param: "query",
        selectors: ".vrTitle a, h3 a",
    };
    pub const SO360: Self = Self {
        engine: Engine::So360,
        endpoint: "https://www.so.com/s",
        query_param: "q",
        selectors: "h3 a, .res-list h3 a",
    };
}

pub struct HtmlSearchBackend {
    client: Client,
    profile: EngineProfile,
    endpoint: Url,
}

impl HtmlSearchBackend {
    /// Backend pointed at the engine's public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`MentionError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(profile: EngineProfile, timeout_secs: u64) -> Result<Self, MentionError> {
        Self::with_endpoint(profile, profile.endpoint, timeout_secs)
    }

    /// Backend with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MentionError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`MentionError::InvalidBaseUrl`] if `endpoint` is not a valid URL.
    pub fn with_endpoint(
        profile: EngineProfile,
        endpoint: &str,
        timeout_secs: u64,
    ) -> Result<Self, MentionError> {
        let client = browser_client(Duration::from_secs(timeout_secs))?;
        let endpoint = Url::parse(endpoint).map_err(|e| MentionError::InvalidBaseUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            profile,
            endpoint,
        })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(self.profile.query_param, query);
        url
    }
}

#[async_trait]
impl SearchBackend for HtmlSearchBackend {
    fn engine(&self) -> Engine {
        self.profile.engine
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, FetchError> {
        let url = self.search_url(query);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(parse_result_page(
            &body,
            &self.profile,
            &self.endpoint,
            max_results,
        ))
    }
}

/// Result anchors in document order, hrefs made absolute against the engine.
pub(crate) fn parse_result_page(
    body: &str,
    profile: &EngineProfile,
    base: &Url,
    max_results: usize,
) -> Vec<SearchHit> {
    let Ok(selector) = Selector::parse(profile.selectors) else {
        return Vec::new();
    };
    let document = Html::parse_document(body);

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor
                .value()
                .attr("href")?
                .trim()
                .trim_matches(|c| matches!(c, '"' | '\'' | '`'));
            if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                return None;
            }
            let url = base.join(href).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            Some(SearchHit {
                title: element_text(&anchor),
                url: url.to_string(),
                snippet: None,
                engine: profile.engine.as_str().to_string(),
            })
        })
        .take(max_results)
        .collect()
}
