use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{ChatMessage, LanguageModel};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`.
    ///
    /// Must never fail: on any problem the input comes back unchanged.
    async fn translate(&self, text: &str, target_language: &str) -> String;
}

/// Returns its input untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str, _target_language: &str) -> String {
        text.to_string()
    }
}

/// Translates by prompting a [`LanguageModel`].
pub struct LlmTranslator {
    model: Arc<dyn LanguageModel>,
}

impl LlmTranslator {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let messages = [
            ChatMessage::system(format!(
                "You are a precise professional translator. Translate the user's text \
                 fully and faithfully into {}. Preserve meaning and tone. Output only \
                 the translation.",
                language_name(target_language)
            )),
            ChatMessage::user(text),
        ];

        match self.model.complete(&messages).await {
            Some(translated) => translated,
            None => {
                tracing::debug!(target_language, "translation unavailable, keeping source text");
                text.to_string()
            }
        }
    }
}

fn language_name(code: &str) -> &str {
    match code.split(['-', '_']).next().unwrap_or(code) {
        "zh" => "Simplified Chinese",
        "en" => "English",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ru" => "Russian",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct ScriptedModel {
        reply: Option<String>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Option<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn identity_returns_input_verbatim() {
        let out = IdentityTranslator.translate("  mixed 文本 ", "zh").await;
        assert_eq!(out, "  mixed 文本 ");
    }

    #[tokio::test]
    async fn llm_translator_uses_model_reply() {
        let model = Arc::new(ScriptedModel {
            reply: Some("续航很好".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let translator = LlmTranslator::new(model.clone());
        let out = translator.translate("great battery", "zh").await;
        assert_eq!(out, "续航很好");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0][0].content.contains("Simplified Chinese"));
        assert_eq!(seen[0][1].content, "great battery");
    }

    #[tokio::test]
    async fn llm_translator_falls_back_to_source_text() {
        let model = Arc::new(ScriptedModel {
            reply: None,
            seen: Mutex::new(Vec::new()),
        });
        let translator = LlmTranslator::new(model);
        assert_eq!(translator.translate("hello", "zh").await, "hello");
    }

    #[tokio::test]
    async fn blank_text_skips_the_model() {
        let model = Arc::new(ScriptedModel {
            reply: Some("should not be used".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let translator = LlmTranslator::new(model.clone());
        assert_eq!(translator.translate("   ", "zh").await, "   ");
        assert!(model.seen.lock().unwrap().is_empty());
    }
}
