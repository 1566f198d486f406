//! Turns insights into a brand summary, degrading from a structured model
//! reply to a free-text reply to a deterministic rule-based summary.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::llm::{ChatMessage, LanguageModel};
use crate::types::{Insights, SynthesisResult, SynthesisSource};

const MAX_TEXT_POINTS: usize = 5;
const RULE_CLUSTERS: usize = 5;
const CONTEXT_KEYWORDS: usize = 12;
const CONTEXT_CLUSTERS: usize = 6;
const CONTEXT_SAMPLES: usize = 2;

pub const GENERIC_RISK: &str =
    "Monitor high-frequency negative topics and respond to user complaints promptly";
pub const GENERIC_ADVICE: &str = "Reinforce content and word-of-mouth around positive themes";

const SYSTEM_PROMPT: &str = "You are a brand public-opinion analyst. Given aggregated \
     mention statistics, summarise the brand's current reputation. Reply with JSON only, \
     using the keys core_points, risk and advice, each an array of short strings.";

#[derive(Debug, Deserialize)]
struct StructuredReply {
    #[serde(default)]
    core_points: Vec<String>,
    #[serde(default)]
    risk: Vec<String>,
    #[serde(default)]
    advice: Vec<String>,
}

pub struct SynthesisEngine {
    model: Option<Arc<dyn LanguageModel>>,
}

impl SynthesisEngine {
    /// Without a model every summary is rule-based.
    #[must_use]
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Always returns a usable summary; never fails.
    pub async fn summarize(&self, brand: &str, insights: &Insights) -> SynthesisResult {
        let Some(model) = &self.model else {
            return rule_based(brand, insights);
        };

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_context(brand, insights)),
        ];
        let Some(reply) = model.complete(&messages).await else {
            tracing::debug!(brand, "no model reply, using rule-based summary");
            return rule_based(brand, insights);
        };

        if let Some(structured) = parse_structured(&reply) {
            return SynthesisResult {
                brand: brand.to_string(),
                core_points: structured.core_points,
                risk: structured.risk,
                advice: structured.advice,
                sentiment: insights.sentiment,
                source: SynthesisSource::Llm,
            };
        }

        tracing::debug!(brand, "model reply was not structured JSON, splitting lines");
        from_text_lines(brand, &reply, insights)
    }
}

fn build_context(brand: &str, insights: &Insights) -> String {
    let keywords: Vec<_> = insights.keywords.iter().take(CONTEXT_KEYWORDS).collect();
    let clusters: Vec<_> = insights
        .clusters
        .iter()
        .take(CONTEXT_CLUSTERS)
        .map(|c| {
            let samples: Vec<_> = c.samples.iter().take(CONTEXT_SAMPLES).collect();
            json!({ "label": c.label, "size": c.size, "samples": samples })
        })
        .collect();
    json!({
        "brand": brand,
        "sentiment": insights.sentiment,
        "keywords": keywords,
        "clusters": clusters,
    })
    .to_string()
}

/// Parse a JSON reply, tolerating a surrounding Markdown code fence.
/// A reply without core points is treated as unusable.
fn parse_structured(reply: &str) -> Option<StructuredReply> {
    let parsed: StructuredReply = serde_json::from_str(strip_code_fence(reply)).ok()?;
    if parsed.core_points.iter().all(|p| p.trim().is_empty()) {
        return None;
    }
    Some(parsed)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn from_text_lines(brand: &str, reply: &str, insights: &Insights) -> SynthesisResult {
    let core_points: Vec<String> = reply
        .lines()
        .map(|line| line.trim_matches(|c: char| c == '-' || c == '•' || c.is_whitespace()))
        .filter(|line| !line.is_empty())
        .take(MAX_TEXT_POINTS)
        .map(str::to_string)
        .collect();

    if core_points.is_empty() {
        return rule_based(brand, insights);
    }

    SynthesisResult {
        brand: brand.to_string(),
        core_points,
        risk: vec![GENERIC_RISK.to_string()],
        advice: vec![GENERIC_ADVICE.to_string()],
        sentiment: insights.sentiment,
        source: SynthesisSource::LlmText,
    }
}

/// Deterministic summary from the largest clusters.
#[must_use]
pub fn rule_based(brand: &str, insights: &Insights) -> SynthesisResult {
    let mut clusters: Vec<_> = insights.clusters.iter().collect();
    clusters.sort_by(|a, b| b.size.cmp(&a.size));

    let mut core_points: Vec<String> = clusters
        .into_iter()
        .take(RULE_CLUSTERS)
        .map(|c| {
            format!(
                "topic {} (size {}): samples — {}",
                c.label,
                c.size,
                c.samples.join(" | ")
            )
        })
        .collect();
    if core_points.is_empty() {
        core_points.push(format!("No dominant topics found for {brand}."));
    }

    SynthesisResult {
        brand: brand.to_string(),
        core_points,
        risk: vec![GENERIC_RISK.to_string()],
        advice: vec![GENERIC_ADVICE.to_string()],
        sentiment: insights.sentiment,
        source: SynthesisSource::Rules,
    }
}

#[cfg(test)]
#[path = "synthesis_test.rs"]
mod tests;
