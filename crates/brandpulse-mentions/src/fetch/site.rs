//! Extraction for platforms whose generic HTML yields little useful text.
//!
//! Tiers, best first: platform selectors, whole-page visible text, then a
//! read-through proxy that renders the page server-side.

use std::time::Duration;

use reqwest::header::REFERER;
use reqwest::{Client, Url};
use scraper::{Html, Selector};

use crate::config::MentionConfig;
use crate::error::{FetchError, MentionError};
use crate::fetch::{browser_client, get_page, DocumentFinisher};
use crate::text::{element_text, normalize_whitespace, og_title, visible_text};
use crate::types::Document;

const TITLE_SELECTORS: &[&str] = &[
    "h1.QuestionHeader-title",
    "h1.Post-Title",
    "h1.ContentItem-title",
];
const BODY_SELECTORS: &[&str] = &["article p", ".RichText p, .RichContent-inner p"];

pub struct SiteSpecificExtractor {
    client: Client,
    proxy_base: String,
    min_chars: usize,
    finisher: DocumentFinisher,
}

struct Extracted {
    title: Option<String>,
    article: String,
    page: String,
}

impl SiteSpecificExtractor {
    pub(crate) fn new(
        config: &MentionConfig,
        finisher: DocumentFinisher,
    ) -> Result<Self, MentionError> {
        Ok(Self {
            client: browser_client(Duration::from_secs(config.site_fetch_timeout_secs))?,
            proxy_base: config.read_proxy_base.trim_end_matches('/').to_string(),
            min_chars: config.min_extracted_chars,
            finisher,
        })
    }

    /// Extract a document, degrading through the tiers until one yields text.
    ///
    /// # Errors
    ///
    /// Returns the direct-request error when neither the page nor the proxy
    /// produced any text, or [`FetchError::EmptyContent`] if they answered
    /// with nothing readable.
    pub async fn extract(&self, url: &str) -> Result<Document, FetchError> {
        let request = self.client.get(url).header(REFERER, referer_for(url));
        let page = match get_page(request).await {
            Ok(page) if page.status.is_success() => page,
            Ok(page) => {
                let err = FetchError::UnexpectedStatus {
                    status: page.status.as_u16(),
                    url: url.to_string(),
                };
                return self.proxy_only(url, err).await;
            }
            Err(e) => return self.proxy_only(url, e).await,
        };

        let Extracted {
            title,
            article,
            page,
        } = extract_structured(&page.body);

        let text = if char_len(&article) >= self.min_chars {
            article
        } else if char_len(&page) >= self.min_chars {
            page
        } else if let Some(proxied) = self.read_via_proxy(url).await {
            proxied
        } else if char_len(&page) >= char_len(&article) {
            page
        } else {
            article
        };

        if text.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }
        Ok(self.finisher.finish(url.to_string(), title, text).await)
    }

    async fn proxy_only(&self, url: &str, direct_error: FetchError) -> Result<Document, FetchError> {
        tracing::debug!(url, error = %direct_error, "direct site fetch failed, trying read proxy");
        match self.read_via_proxy(url).await {
            Some(text) => Ok(self.finisher.finish(url.to_string(), None, text).await),
            None => Err(direct_error),
        }
    }

    /// Page text rendered by the read-through proxy, if long enough to use.
    async fn read_via_proxy(&self, url: &str) -> Option<String> {
        let proxy_url = proxy_url(&self.proxy_base, url);
        match get_page(self.client.get(&proxy_url)).await {
            Ok(page) if page.status.is_success() => {
                let text = normalize_whitespace(&page.body);
                (char_len(&text) > self.min_chars).then_some(text)
            }
            Ok(page) => {
                tracing::debug!(url, status = page.status.as_u16(), "read proxy refused page");
                None
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "read proxy request failed");
                None
            }
        }
    }
}

/// `{base}/http://{url without scheme}`, the form the read proxy expects.
pub(crate) fn proxy_url(base: &str, url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    format!("{}/http://{stripped}", base.trim_end_matches('/'))
}

fn referer_for(url: &str) -> String {
    match Url::parse(url).map(|u| u.origin()) {
        Ok(origin) if origin.is_tuple() => format!("{}/", origin.ascii_serialization()),
        _ => url.to_string(),
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn extract_structured(body: &str) -> Extracted {
    let document = Html::parse_document(body);

    let title = TITLE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| {
            document
                .select(&sel)
                .map(|el| element_text(&el))
                .find(|t| !t.is_empty())
        })
        .or_else(|| og_title(&document));

    let paragraphs: Vec<String> = BODY_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .flat_map(|sel| {
            document
                .select(&sel)
                .map(|el| element_text(&el))
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .collect();

    Extracted {
        title,
        article: paragraphs.join("\n"),
        page: visible_text(&document),
    }
}
