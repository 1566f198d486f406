use std::collections::BTreeMap;

use async_trait::async_trait;

use super::*;
use crate::types::{Cluster, SentimentTally};

struct CannedModel(Option<&'static str>);

#[async_trait]
impl LanguageModel for CannedModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Option<String> {
        self.0.map(str::to_string)
    }
}

fn engine(reply: Option<&'static str>) -> SynthesisEngine {
    SynthesisEngine::new(Some(Arc::new(CannedModel(reply))))
}

fn insights() -> Insights {
    Insights {
        keywords: vec![("battery".to_string(), 3), ("screen".to_string(), 2)],
        clusters: vec![
            Cluster {
                label: "screen".to_string(),
                size: 1,
                samples: vec!["screen too dim".to_string()],
            },
            Cluster {
                label: "battery".to_string(),
                size: 3,
                samples: vec![
                    "battery lasts".to_string(),
                    "battery drains".to_string(),
                    "battery ok".to_string(),
                ],
            },
        ],
        sentiment: SentimentTally {
            positive: 2,
            negative: 1,
            neutral: 1,
        },
        trend: Vec::new(),
        channels: BTreeMap::from([("weibo".to_string(), 4)]),
    }
}

#[tokio::test]
async fn structured_reply_is_used_verbatim() {
    let reply = r#"{"core_points":["Battery praised"],"risk":["Screen complaints"],"advice":["Ship a brightness fix"]}"#;
    let result = engine(Some(reply)).summarize("Acme", &insights()).await;
    assert_eq!(result.source, SynthesisSource::Llm);
    assert_eq!(result.core_points, vec!["Battery praised"]);
    assert_eq!(result.risk, vec!["Screen complaints"]);
    assert_eq!(result.advice, vec!["Ship a brightness fix"]);
    assert_eq!(result.sentiment, insights().sentiment);
    assert_eq!(result.brand, "Acme");
}

#[tokio::test]
async fn fenced_json_reply_is_unwrapped() {
    let reply = "```json\n{\"core_points\":[\"Fenced point\"]}\n```";
    let result = engine(Some(reply)).summarize("Acme", &insights()).await;
    assert_eq!(result.source, SynthesisSource::Llm);
    assert_eq!(result.core_points, vec!["Fenced point"]);
    assert!(result.risk.is_empty());
}

#[tokio::test]
async fn free_text_reply_keeps_first_five_cleaned_lines() {
    let reply = "- one\n• two\n\n  three  \n- four\n- five\n- six\n- seven";
    let result = engine(Some(reply)).summarize("Acme", &insights()).await;
    assert_eq!(result.source, SynthesisSource::LlmText);
    assert_eq!(result.core_points, vec!["one", "two", "three", "four", "five"]);
    assert_eq!(result.risk, vec![GENERIC_RISK]);
    assert_eq!(result.advice, vec![GENERIC_ADVICE]);
}

#[tokio::test]
async fn json_without_core_points_falls_back_to_lines() {
    let result = engine(Some(r#"{"risk":["x"]}"#))
        .summarize("Acme", &insights())
        .await;
    assert_eq!(result.source, SynthesisSource::LlmText);
    assert_eq!(result.core_points, vec![r#"{"risk":["x"]}"#]);
}

#[tokio::test]
async fn missing_model_reply_uses_rules() {
    let result = engine(None).summarize("Acme", &insights()).await;
    assert_eq!(result.source, SynthesisSource::Rules);

    let no_model = SynthesisEngine::new(None)
        .summarize("Acme", &insights())
        .await;
    assert_eq!(no_model, result);
}

#[test]
fn rule_based_orders_clusters_by_size_and_joins_every_sample() {
    let result = rule_based("Acme", &insights());
    assert_eq!(
        result.core_points,
        vec![
            "topic battery (size 3): samples — battery lasts | battery drains | battery ok"
                .to_string(),
            "topic screen (size 1): samples — screen too dim".to_string(),
        ]
    );
    assert_eq!(result.risk, vec![GENERIC_RISK]);
    assert_eq!(result.advice, vec![GENERIC_ADVICE]);
}

#[test]
fn rule_based_is_deterministic() {
    assert_eq!(rule_based("Acme", &insights()), rule_based("Acme", &insights()));
}

#[test]
fn rule_based_with_no_clusters_still_has_a_point() {
    let result = rule_based("Acme", &Insights::default());
    assert_eq!(result.core_points.len(), 1);
    assert!(result.core_points[0].contains("Acme"));
}
