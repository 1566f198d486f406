use chrono::NaiveDate;

use super::*;

fn doc(url: &str, text: &str, published: Option<(i32, u32, u32)>) -> Document {
    Document {
        url: url.to_string(),
        title: None,
        text: text.to_string(),
        language: "en".to_string(),
        published: published.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
    }
}

fn sample_docs() -> Vec<Document> {
    vec![
        doc(
            "https://weibo.com/1",
            "battery lasts two days, great battery",
            Some((2024, 5, 2)),
        ),
        doc(
            "https://www.zhihu.com/question/2",
            "screen too dim, disappointed with screen",
            Some((2024, 5, 1)),
        ),
        doc(
            "https://forum.example.com/t/3",
            "battery drains fast after update",
            Some((2024, 5, 2)),
        ),
        doc("https://news.sina.com.cn/4", "a b c", None),
    ]
}

#[test]
fn empty_input_gives_empty_insights() {
    let insights = analyze(&[], &AnalysisProfile::default());
    assert_eq!(insights, Insights::default());
    assert_eq!(insights.sentiment.total(), 0);
}

#[test]
fn keywords_rank_by_count_then_first_appearance() {
    let insights = analyze(&sample_docs(), &AnalysisProfile::default());
    assert_eq!(insights.keywords[0], ("battery".to_string(), 3));
    assert_eq!(insights.keywords[1], ("screen".to_string(), 2));
    // Ties of count 1 keep first-seen order: "lasts" appears before "two".
    let lasts = insights.keywords.iter().position(|(k, _)| k == "lasts");
    let two = insights.keywords.iter().position(|(k, _)| k == "two");
    assert!(lasts < two);
    assert!(insights.keywords.len() <= 20);
    assert!(insights.keywords.iter().all(|(k, _)| k.chars().count() >= 2));
}

#[test]
fn keywords_include_cjk_runs() {
    let docs = vec![
        doc("https://a.example", "续航 很好 续航", None),
        doc("https://b.example", "拍照 续航", None),
    ];
    let insights = analyze(&docs, &AnalysisProfile::default());
    assert_eq!(insights.keywords[0], ("续航".to_string(), 3));
}

#[test]
fn every_document_lands_in_exactly_one_cluster() {
    let docs = sample_docs();
    let insights = analyze(&docs, &AnalysisProfile::default());
    let total: usize = insights.clusters.iter().map(|c| c.size).sum();
    assert_eq!(total, docs.len());

    // Cluster order follows each cluster's first member.
    let labels: Vec<&str> = insights.clusters.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["battery", "screen", CATCH_ALL_CLUSTER]);
    assert_eq!(insights.clusters[0].size, 2);
    assert_eq!(insights.clusters[2].samples, vec!["a b c".to_string()]);
}

#[test]
fn cluster_samples_are_capped_and_truncated() {
    let long_text = format!("phone {}", "x".repeat(400));
    let docs: Vec<Document> = (0..5)
        .map(|i| doc(&format!("https://s{i}.example"), &long_text, None))
        .collect();
    let insights = analyze(&docs, &AnalysisProfile::default());
    let cluster = &insights.clusters[0];
    assert_eq!(cluster.size, 5);
    assert_eq!(cluster.samples.len(), 3);
    assert!(cluster.samples.iter().all(|s| s.chars().count() == 300));
}

#[test]
fn sentiment_tally_partitions_documents() {
    let docs = sample_docs();
    let insights = analyze(&docs, &AnalysisProfile::default());
    assert_eq!(insights.sentiment.total(), docs.len());
    assert_eq!(insights.sentiment.positive, 1);
    assert_eq!(insights.sentiment.negative, 1);
    assert_eq!(insights.sentiment.neutral, 2);
}

#[test]
fn positive_term_wins_over_negative_term() {
    let profile = AnalysisProfile::default();
    assert_eq!(
        classify_sentiment("Great phone but I want a REFUND", &profile),
        Sentiment::Positive
    );
    assert_eq!(
        classify_sentiment("Terrible support", &profile),
        Sentiment::Negative
    );
    assert_eq!(classify_sentiment("它的续航不错", &profile), Sentiment::Positive);
    assert_eq!(classify_sentiment("just a phone", &profile), Sentiment::Neutral);
}

#[test]
fn trend_counts_dated_documents_in_strict_date_order() {
    let insights = analyze(&sample_docs(), &AnalysisProfile::default());
    let dates: Vec<NaiveDate> = insights.trend.iter().map(|p| p.date).collect();
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(insights.trend.len(), 2);
    assert_eq!(insights.trend[1].count, 2);
    let dated = sample_docs().iter().filter(|d| d.published.is_some()).count();
    assert_eq!(insights.trend.iter().map(|p| p.count).sum::<usize>(), dated);
}

#[test]
fn channels_partition_documents() {
    let docs = sample_docs();
    let insights = analyze(&docs, &AnalysisProfile::default());
    assert_eq!(insights.channels.values().sum::<usize>(), docs.len());
    assert_eq!(insights.channels.get("weibo"), Some(&1));
    assert_eq!(insights.channels.get("zhihu"), Some(&1));
    assert_eq!(insights.channels.get("news"), Some(&1));
    assert_eq!(insights.channels.get("other"), Some(&1));
}
