use thiserror::Error;

/// Why a single page fetch or search attempt produced nothing usable.
///
/// Never fatal to a run: callers skip the item or move to the next tier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("no usable content at {url}")]
    EmptyContent { url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Short outcome label for `FETCH_FAIL` log lines.
    #[must_use]
    pub fn class(&self) -> String {
        match self {
            FetchError::Http(e) if e.is_timeout() => "error=timeout".to_string(),
            FetchError::Http(e) if e.is_connect() => "error=connect".to_string(),
            FetchError::Http(e) if e.is_redirect() => "error=redirect".to_string(),
            FetchError::Http(e) if e.is_decode() || e.is_body() => "error=body".to_string(),
            FetchError::Http(_) => "error=http".to_string(),
            FetchError::UnexpectedStatus { status, .. } => format!("status={status}"),
            FetchError::EmptyContent { .. } => "error=empty".to_string(),
            FetchError::InvalidUrl { .. } => "error=invalid_url".to_string(),
        }
    }
}

/// Construction-time failures for the HTTP-backed components.
#[derive(Debug, Error)]
pub enum MentionError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
