//! Keyword, cluster, sentiment, trend, and channel analysis.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use brandpulse_core::AnalysisProfile;
use regex::Regex;

use crate::text::truncate_chars;
use crate::types::{Cluster, Document, Insights, SentimentTally, TrendPoint};

const MAX_KEYWORDS: usize = 20;
const MAX_CLUSTER_SEEDS: usize = 10;
const MIN_TOKEN_CHARS: usize = 2;
const SAMPLES_PER_CLUSTER: usize = 3;
const SAMPLE_CHARS: usize = 300;
/// Label of the cluster holding documents that contain no seed keyword.
pub const CATCH_ALL_CLUSTER: &str = "other";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{4e00}-\u{9fff}A-Za-z0-9]+").expect("valid token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Analyse a deduplicated document set. Empty input yields empty insights.
#[must_use]
pub fn analyze(documents: &[Document], profile: &AnalysisProfile) -> Insights {
    let tokens: Vec<Vec<&str>> = documents.iter().map(|d| tokenize(&d.text)).collect();
    let keywords = top_keywords(&tokens);
    let clusters = cluster(documents, &tokens, &keywords);

    let mut sentiment = SentimentTally::default();
    for doc in documents {
        match classify_sentiment(&doc.text, profile) {
            Sentiment::Positive => sentiment.positive += 1,
            Sentiment::Negative => sentiment.negative += 1,
            Sentiment::Neutral => sentiment.neutral += 1,
        }
    }

    let mut per_day = BTreeMap::new();
    for date in documents.iter().filter_map(|d| d.published) {
        *per_day.entry(date).or_insert(0_usize) += 1;
    }
    let trend = per_day
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect();

    let mut channels = BTreeMap::new();
    for doc in documents {
        *channels
            .entry(profile.classify_channel(&doc.url).to_string())
            .or_insert(0_usize) += 1;
    }

    Insights {
        keywords,
        clusters,
        sentiment,
        trend,
        channels,
    }
}

/// Lexicon sentiment; a positive hit wins over a negative one.
#[must_use]
pub fn classify_sentiment(text: &str, profile: &AnalysisProfile) -> Sentiment {
    let lower = text.to_lowercase();
    let hits = |terms: &[String]| terms.iter().any(|t| lower.contains(&t.to_lowercase()));

    if hits(&profile.positive_terms) {
        Sentiment::Positive
    } else if hits(&profile.negative_terms) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Most frequent tokens of two or more characters; ties keep first-seen order.
fn top_keywords(tokens: &[Vec<&str>]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut first_seen = 0_usize;
    for token in tokens.iter().flatten() {
        if token.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        let entry = counts.entry(*token).or_insert_with(|| {
            first_seen += 1;
            (0, first_seen)
        });
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, order))| (token, count, order))
        .collect();
    ranked.sort_by(|(_, count_a, order_a), (_, count_b, order_b)| {
        count_b.cmp(count_a).then(order_a.cmp(order_b))
    });
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(token, count, _)| (token.to_string(), count))
        .collect()
}

/// Assign each document to the highest-ranked seed keyword it contains, or
/// to the catch-all cluster. Clusters appear in order of first member.
fn cluster(
    documents: &[Document],
    tokens: &[Vec<&str>],
    keywords: &[(String, usize)],
) -> Vec<Cluster> {
    let seeds: Vec<&str> = keywords
        .iter()
        .take(MAX_CLUSTER_SEEDS)
        .map(|(k, _)| k.as_str())
        .collect();

    // Keyed by seed rank; `None` is the catch-all.
    let mut groups: Vec<(Option<usize>, Vec<usize>)> = Vec::new();
    for (doc_idx, doc_tokens) in tokens.iter().enumerate() {
        let present: HashSet<&str> = doc_tokens.iter().copied().collect();
        let key = seeds.iter().position(|seed| present.contains(seed));
        if let Some(pos) = groups.iter().position(|(k, _)| *k == key) {
            groups[pos].1.push(doc_idx);
        } else {
            groups.push((key, vec![doc_idx]));
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| Cluster {
            label: key.map_or(CATCH_ALL_CLUSTER, |rank| seeds[rank]).to_string(),
            size: members.len(),
            samples: members
                .iter()
                .take(SAMPLES_PER_CLUSTER)
                .map(|&i| truncate_chars(&documents[i].text, SAMPLE_CHARS).to_string())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "insight_test.rs"]
mod tests;
