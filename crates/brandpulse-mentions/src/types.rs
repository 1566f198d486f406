//! Domain types shared by every stage of a mention run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One result row returned by a search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
    /// Engine that produced the row (e.g. `"bing"`, or the upstream engine a
    /// metasearch instance reported).
    pub engine: String,
}

/// A fetched, cleaned, possibly translated web page.
///
/// Built once by a fetcher and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: Option<String>,
    /// Whitespace-normalised visible text.
    pub text: String,
    /// Language detected on the fetched text before any translation.
    pub language: String,
    pub published: Option<NaiveDate>,
}

/// A group of documents sharing a top-keyword seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub label: String,
    pub size: usize,
    /// Up to three member texts, each truncated to 300 characters.
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Aggregate analysis over a deduplicated document set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// At most 20 `(token, count)` pairs, most frequent first.
    pub keywords: Vec<(String, usize)>,
    pub clusters: Vec<Cluster>,
    pub sentiment: SentimentTally,
    /// Per-day document counts, strictly increasing by date.
    pub trend: Vec<TrendPoint>,
    pub channels: BTreeMap<String, usize>,
}

/// Which tier of the synthesis fallback chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisSource {
    /// Structured JSON reply from the language model.
    Llm,
    /// Free-text model reply split into lines.
    LlmText,
    /// Deterministic summary built from clusters.
    Rules,
    /// Fixed message used when a run retrieved nothing.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub brand: String,
    pub core_points: Vec<String>,
    pub risk: Vec<String>,
    pub advice: Vec<String>,
    pub sentiment: SentimentTally,
    pub source: SynthesisSource,
}

/// How the documents in a report were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Live,
    Demo,
    Placeholder,
}

/// Everything one coordinator run produced, in serialisable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub brand: String,
    pub window_days: u32,
    pub mode: RunMode,
    pub documents: Vec<Document>,
    pub insights: Insights,
    pub synthesis: SynthesisResult,
    /// Ordered run log lines.
    pub logs: Vec<String>,
}
