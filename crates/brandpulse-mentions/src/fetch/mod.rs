//! Page fetching: URL hygiene, generic HTML extraction, site routing,
//! translation, and publish-date discovery.

mod site;

pub use site::SiteSpecificExtractor;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use brandpulse_core::AnalysisProfile;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client, StatusCode, Url};
use scraper::{Html, Selector};

use crate::config::MentionConfig;
use crate::error::{FetchError, MentionError};
use crate::run_log::RunLog;
use crate::text::{
    detect_language, find_publish_date, normalize_whitespace, page_title, same_language,
    truncate_chars, visible_text, UNKNOWN_LANGUAGE,
};
use crate::translate::Translator;
use crate::types::Document;

pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGES: &str = "zh-CN,zh;q=0.9,en;q=0.8";
const MAX_REDIRECTS: usize = 5;
/// Relative `/link?` URLs come from Sogou result pages.
const SOGOU_ORIGIN: &str = "https://www.sogou.com";

static REFRESH_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)url\s*=?\s*([^;]+)").expect("valid meta refresh regex"));

/// Anything that can turn a URL into a [`Document`].
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page, appending a `FETCH_OK` or `FETCH_FAIL` line to `log`.
    async fn fetch(&self, url: &str, log: &RunLog) -> Result<Document, FetchError>;
}

/// Browser-like request headers shared by every page and search client.
pub(crate) fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGES));
    headers
}

pub(crate) fn browser_client(timeout: Duration) -> Result<Client, MentionError> {
    Ok(Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(browser_headers())
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .build()?)
}

pub(crate) struct Page {
    pub status: StatusCode,
    pub final_url: String,
    pub body: String,
}

pub(crate) async fn get_page(
    request: reqwest::RequestBuilder,
) -> Result<Page, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    let final_url = response.url().to_string();
    let body = response.text().await?;
    Ok(Page {
        status,
        final_url,
        body,
    })
}

/// Strip stray quoting and complete Sogou's relative redirect links.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] when the cleaned value is not an
/// absolute `http`/`https` URL.
pub fn clean_url(raw: &str) -> Result<String, FetchError> {
    let trimmed = raw
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim();
    let candidate = if trimmed.starts_with("/link?") {
        format!("{SOGOU_ORIGIN}{trimmed}")
    } else {
        trimmed.to_string()
    };

    let parsed = Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(candidate)
}

/// Language detection, optional translation, and date discovery applied to
/// every freshly extracted page.
#[derive(Clone)]
pub(crate) struct DocumentFinisher {
    translator: Arc<dyn Translator>,
    target_language: String,
    translate_window_chars: usize,
}

impl DocumentFinisher {
    pub(crate) fn new(translator: Arc<dyn Translator>, config: &MentionConfig) -> Self {
        Self {
            translator,
            target_language: config.target_language.clone(),
            translate_window_chars: config.translate_window_chars,
        }
    }

    pub(crate) async fn finish(&self, url: String, title: Option<String>, text: String) -> Document {
        let language = detect_language(&text);
        let text = if language == UNKNOWN_LANGUAGE || same_language(language, &self.target_language)
        {
            text
        } else {
            self.translate(text).await
        };
        let published = find_publish_date(&text);

        Document {
            url,
            title,
            text,
            language: language.to_string(),
            published,
        }
    }

    /// Only the leading window is translated; an unchanged reply means the
    /// translator declined, so the full original text is kept.
    async fn translate(&self, text: String) -> String {
        let head = truncate_chars(&text, self.translate_window_chars);
        let translated = self.translator.translate(head, &self.target_language).await;
        if translated == head {
            text
        } else {
            normalize_whitespace(&translated)
        }
    }
}

/// Fetches arbitrary result pages, routing configured platforms to the
/// [`SiteSpecificExtractor`].
pub struct FetchClient {
    client: Client,
    profile: Arc<AnalysisProfile>,
    site: SiteSpecificExtractor,
    finisher: DocumentFinisher,
}

impl FetchClient {
    /// # Errors
    ///
    /// Returns [`MentionError::Http`] if an HTTP client cannot be constructed.
    pub fn new(
        config: &MentionConfig,
        profile: Arc<AnalysisProfile>,
        translator: Arc<dyn Translator>,
    ) -> Result<Self, MentionError> {
        let finisher = DocumentFinisher::new(translator, config);
        let site = SiteSpecificExtractor::new(config, finisher.clone())?;
        Ok(Self {
            client: browser_client(Duration::from_secs(config.fetch_timeout_secs))?,
            profile,
            site,
            finisher,
        })
    }

    async fn fetch_routed(&self, raw_url: &str) -> Result<(Document, &'static str), FetchError> {
        let url = clean_url(raw_url)?;
        if self.profile.is_site_specific(&url) {
            return self.site.extract(&url).await.map(|doc| (doc, "site"));
        }

        let page = get_page(self.client.get(&url)).await?;
        if self.profile.is_site_specific(&page.final_url) {
            return self.site.extract(&page.final_url).await.map(|doc| (doc, "site"));
        }
        if !page.status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: page.status.as_u16(),
                url,
            });
        }

        let body = match meta_refresh_target(&page.body, &page.final_url) {
            Some(target) => {
                if self.profile.is_site_specific(&target) {
                    return self.site.extract(&target).await.map(|doc| (doc, "site"));
                }
                let hop = get_page(self.client.get(&target)).await?;
                if !hop.status.is_success() {
                    return Err(FetchError::UnexpectedStatus {
                        status: hop.status.as_u16(),
                        url: target,
                    });
                }
                hop.body
            }
            None => page.body,
        };

        let (title, text) = extract_generic(&body);
        if text.is_empty() {
            return Err(FetchError::EmptyContent { url });
        }
        let doc = self.finisher.finish(url, title, text).await;
        Ok((doc, "generic"))
    }
}

#[async_trait]
impl PageSource for FetchClient {
    async fn fetch(&self, url: &str, log: &RunLog) -> Result<Document, FetchError> {
        match self.fetch_routed(url).await {
            Ok((doc, via)) => {
                log.push(format!(
                    "FETCH_OK {} via={via} lang={} len={}",
                    doc.url,
                    doc.language,
                    doc.text.chars().count()
                ));
                Ok(doc)
            }
            Err(e) => {
                log.push(format!("FETCH_FAIL {url} {}", e.class()));
                tracing::debug!(url, error = %e, "page fetch failed");
                Err(e)
            }
        }
    }
}

/// Target of a `<meta http-equiv="refresh">` tag, resolved against the page URL.
fn meta_refresh_target(body: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("meta[http-equiv]").ok()?;
    let content = document.select(&selector).find_map(|el| {
        let equiv = el.value().attr("http-equiv")?;
        if equiv.trim().eq_ignore_ascii_case("refresh") {
            el.value().attr("content")
        } else {
            None
        }
    })?;

    let raw = REFRESH_URL.captures(content)?.get(1)?.as_str();
    let target = raw
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\''))
        .trim();
    if target.is_empty() {
        return None;
    }

    match Url::parse(page_url).and_then(|base| base.join(target)) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(_) => Some(target.to_string()),
    }
}

fn extract_generic(body: &str) -> (Option<String>, String) {
    let document = Html::parse_document(body);
    (page_title(&document), visible_text(&document))
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
