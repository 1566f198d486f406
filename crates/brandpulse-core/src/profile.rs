//! Analysis profile: lexicons, channel rules, and query expansion terms.
//!
//! The built-in profile targets Chinese-language consumer platforms. A YAML
//! file may override any subset of fields; missing fields keep the built-in
//! values.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Label reserved for documents no channel rule matches.
pub const DEFAULT_CHANNEL: &str = "other";

/// Placeholder substituted with the normalised brand in directed templates.
pub const BRAND_PLACEHOLDER: &str = "{brand}";

/// Maps URL substrings to a channel label. Rules are tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRule {
    pub label: String,
    pub patterns: Vec<String>,
}

impl ChannelRule {
    fn new(label: &str, patterns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisProfile {
    /// Any of these as a substring marks a document positive.
    pub positive_terms: Vec<String>,
    /// Any of these as a substring marks a document negative (unless positive).
    pub negative_terms: Vec<String>,
    pub channel_rules: Vec<ChannelRule>,
    /// Suffixes appended to the brand during query expansion.
    pub topic_terms: Vec<String>,
    /// Site-restricted query templates; each must contain `{brand}`.
    pub directed_templates: Vec<String>,
    /// URL substrings routed to the site-specific extractor.
    pub site_patterns: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self {
            positive_terms: strings(&[
                "好",
                "优秀",
                "点赞",
                "满意",
                "推荐",
                "不错",
                "很棒",
                "great",
                "excellent",
                "satisfied",
                "recommend",
                "love",
            ]),
            negative_terms: strings(&[
                "差",
                "糟糕",
                "投诉",
                "失望",
                "不行",
                "问题",
                "吐槽",
                "差评",
                "terrible",
                "disappointed",
                "complaint",
                "refund",
                "worst",
            ]),
            channel_rules: vec![
                ChannelRule::new("weibo", &["weibo.com"]),
                ChannelRule::new("xiaohongshu", &["xiaohongshu.com", "xhslink"]),
                ChannelRule::new("douyin", &["douyin.com", "iesdouyin"]),
                ChannelRule::new("bilibili", &["bilibili.com"]),
                ChannelRule::new("zhihu", &["zhihu.com"]),
                ChannelRule::new("toutiao", &["toutiao.com"]),
                ChannelRule::new("wechat", &["weixin.qq.com"]),
                ChannelRule::new("news", &["news", "sina.com", "sohu.com", "qq.com"]),
            ],
            topic_terms: strings(&["舆情", "口碑", "投诉", "测评", "评测"]),
            directed_templates: strings(&[
                "{brand} 评测 site:zhihu.com",
                "{brand} 评测 site:bilibili.com",
                "{brand} 口碑 site:weibo.com",
                "{brand} 投诉 site:tieba.baidu.com",
                "{brand} 口碑 site:xiaohongshu.com",
            ]),
            site_patterns: strings(&["zhihu.com"]),
        }
    }
}

impl AnalysisProfile {
    /// Classify a URL into a channel label; `"other"` when no rule matches.
    /// Patterns match case-insensitively.
    #[must_use]
    pub fn classify_channel(&self, url: &str) -> &str {
        let lower = url.to_lowercase();
        self.channel_rules
            .iter()
            .find(|rule| {
                rule.patterns
                    .iter()
                    .any(|p| lower.contains(&p.to_lowercase()))
            })
            .map_or(DEFAULT_CHANNEL, |rule| rule.label.as_str())
    }

    /// Returns `true` if the URL belongs to a platform needing bespoke extraction.
    #[must_use]
    pub fn is_site_specific(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.site_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }
}

/// Load and validate an analysis profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_profile(path: &Path) -> Result<AnalysisProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: AnalysisProfile = serde_yaml::from_str(&content)?;
    validate_profile(&profile)?;

    Ok(profile)
}

fn validate_profile(profile: &AnalysisProfile) -> Result<(), ConfigError> {
    if profile.positive_terms.is_empty() || profile.negative_terms.is_empty() {
        return Err(ConfigError::InvalidProfile(
            "positive_terms and negative_terms must both be non-empty".to_string(),
        ));
    }

    if let Some(term) = profile
        .positive_terms
        .iter()
        .chain(&profile.negative_terms)
        .find(|t| t.trim().is_empty())
    {
        return Err(ConfigError::InvalidProfile(format!(
            "lexicon contains a blank term: {term:?}"
        )));
    }

    let mut seen_labels = HashSet::new();
    for rule in &profile.channel_rules {
        let label = rule.label.trim();
        if label.is_empty() {
            return Err(ConfigError::InvalidProfile(
                "channel rule label must be non-empty".to_string(),
            ));
        }
        if label == DEFAULT_CHANNEL {
            return Err(ConfigError::InvalidProfile(format!(
                "channel label '{DEFAULT_CHANNEL}' is reserved for unmatched URLs"
            )));
        }
        if rule.patterns.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidProfile(format!(
                "channel rule '{label}' has no patterns"
            )));
        }
        if !seen_labels.insert(label.to_string()) {
            return Err(ConfigError::InvalidProfile(format!(
                "duplicate channel label: '{label}'"
            )));
        }
    }

    if let Some(template) = profile
        .directed_templates
        .iter()
        .find(|t| !t.contains(BRAND_PLACEHOLDER))
    {
        return Err(ConfigError::InvalidProfile(format!(
            "directed template '{template}' is missing {BRAND_PLACEHOLDER}"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
