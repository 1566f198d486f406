//! Chat-completions language model collaborator.
//!
//! Any failure (transport, status, malformed body, empty content) yields
//! `None`; callers always have a non-model fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::MentionError;

const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion; `None` when the model is unavailable or replied
    /// with nothing usable.
    async fn complete(&self, messages: &[ChatMessage]) -> Option<String>;
}

/// OpenAI-compatible `chat/completions` client with bearer auth.
pub struct ChatCompletionsClient {
    client: Client,
    api_url: Url,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    /// # Errors
    ///
    /// Returns [`MentionError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`MentionError::InvalidBaseUrl`] if `api_url` does not parse.
    pub fn new(
        api_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, MentionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("brandpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = Url::parse(api_url).map_err(|e| MentionError::InvalidBaseUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_url,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Option<String> {
        let req_body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": TEMPERATURE,
            "stream": false,
        });

        let response = match self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "language model request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "language model returned non-success status");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "language model response was not JSON");
                return None;
            }
        };

        body.get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }
}
