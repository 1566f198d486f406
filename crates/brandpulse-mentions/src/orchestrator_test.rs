use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{Duration, Instant};

use super::*;
use crate::error::FetchError;
use crate::search::{Engine, SearchBackend};

/// Thirty pseudo-random words, so unrelated pages never look like duplicates.
fn distinct_text(seed: u64) -> String {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..30)
        .map(|_| {
            (0..6)
                .map(|_| {
                    state = state
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    char::from(b'a' + u8::try_from((state >> 33) % 26).unwrap())
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct FakeSearch {
    hits_per_query: usize,
}

#[async_trait]
impl SearchBackend for FakeSearch {
    fn engine(&self) -> Engine {
        Engine::Baidu
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, FetchError> {
        let slug: String = query.chars().filter(char::is_ascii_alphanumeric).collect();
        Ok((0..self.hits_per_query.min(max_results))
            .map(|i| SearchHit {
                title: format!("{query} #{i}"),
                url: format!("https://pages.example/{slug}/{}/{i}", query.len()),
                snippet: None,
                engine: "baidu".to_string(),
            })
            .collect())
    }
}

#[derive(Default)]
struct FakePages {
    delay: Duration,
    fail_all: bool,
    stale: HashSet<String>,
    /// Per-URL delay overrides, by hit index suffix.
    fast_suffix: Option<(String, Duration)>,
    started: Mutex<Option<Instant>>,
    dispatch_offsets: Mutex<Vec<Duration>>,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    counter: AtomicUsize,
}

impl FakePages {
    fn start_clock(&self) {
        *self.started.lock().unwrap() = Some(Instant::now());
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch(&self, url: &str, log: &RunLog) -> Result<Document, FetchError> {
        let started = self.started.lock().unwrap().unwrap_or_else(Instant::now);
        self.dispatch_offsets.lock().unwrap().push(started.elapsed());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);

        let delay = match &self.fast_suffix {
            Some((suffix, fast)) if url.ends_with(suffix.as_str()) => *fast,
            _ => self.delay,
        };
        tokio::time::sleep(delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_all {
            log.push(format!("FETCH_FAIL {url} status=503"));
            return Err(FetchError::UnexpectedStatus {
                status: 503,
                url: url.to_string(),
            });
        }

        let seed = self.counter.fetch_add(1, Ordering::SeqCst) as u64;
        let published = if self.stale.contains(url) {
            NaiveDate::from_ymd_opt(2001, 1, 1)
        } else {
            None
        };
        log.push(format!("FETCH_OK {url}"));
        Ok(Document {
            url: url.to_string(),
            title: None,
            text: distinct_text(seed),
            language: "en".to_string(),
            published,
        })
    }
}

fn orchestrator(
    hits_per_query: usize,
    pages: Arc<FakePages>,
    concurrency: usize,
) -> FetchOrchestrator {
    let router = SearchRouter::new(
        vec![Arc::new(FakeSearch { hits_per_query }) as Arc<dyn SearchBackend>],
        true,
        Duration::from_secs(15),
    );
    let config = MentionConfig {
        fetch_concurrency: concurrency,
        ..MentionConfig::default()
    };
    FetchOrchestrator::new(
        Arc::new(router),
        pages,
        Arc::new(AnalysisProfile::default()),
        &config,
    )
}

fn count_lines(log: &RunLog, prefix: &str) -> usize {
    log.snapshot()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .count()
}

#[test]
fn normalize_brand_splits_letters_from_digits() {
    assert_eq!(normalize_brand("Acme X1"), "Acme X 1");
    assert_eq!(normalize_brand("  vivo  X100 Pro "), "vivo X 100 Pro");
    assert_eq!(normalize_brand("小米14"), "小米14");
}

#[test]
fn title_case_matches_word_boundaries() {
    assert_eq!(title_case("acme x 1"), "Acme X 1");
    assert_eq!(title_case("iPHONE 15"), "Iphone 15");
}

#[test]
fn undirected_plan_expands_variants_topics_and_platforms() {
    let plan = build_query_plan("Acme X1", true, 60, &AnalysisProfile::default());
    assert!(!plan.directed);
    assert_eq!(
        &plan.queries[..4],
        &["Acme X 1", "Acme X1", "AcmeX1", "ACME X1"]
    );
    assert!(plan.queries.contains(&"Acme X 1 口碑".to_string()));
    assert!(plan.queries.contains(&"Acme X 1 评测 site:zhihu.com".to_string()));
    assert_eq!(plan.queries.len(), 14);
    assert_eq!(plan.max_results, 60);
    assert_eq!(plan.per_query_cap, 60 / 14);
}

#[test]
fn directed_plan_suppresses_expansion_and_tightens_cap() {
    let profile = AnalysisProfile::default();
    let directed = build_query_plan("X site:forum.example.com", true, 60, &profile);
    assert!(directed.directed);
    assert_eq!(
        directed.queries,
        vec![
            "X site:forum.example.com",
            "Xsite:forum.example.com",
            "X Site:Forum.Example.Com",
            "X SITE:FORUM.EXAMPLE.COM",
        ]
    );
    assert!(directed
        .queries
        .iter()
        .all(|q| profile.topic_terms.iter().all(|t| !q.contains(t.as_str()))));
    assert_eq!(directed.max_results, 30);

    let undirected = build_query_plan("X", true, 60, &profile);
    assert!(directed.per_query_cap < undirected.per_query_cap);
    assert_eq!(directed.per_query_cap, 3);
}

#[test]
fn disabled_expansion_keeps_only_variants() {
    let plan = build_query_plan("vivo", false, 60, &AnalysisProfile::default());
    assert_eq!(plan.queries, vec!["vivo", "Vivo", "VIVO"]);
    assert_eq!(plan.per_query_cap, 6);
}

#[test]
fn per_query_cap_never_drops_below_one() {
    let plan = build_query_plan("vivo", true, 0, &AnalysisProfile::default());
    assert_eq!(plan.per_query_cap, 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_count_limit_is_never_exceeded() {
    let pages = Arc::new(FakePages::default());
    let orch = orchestrator(4, pages.clone(), 1);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 5);

    let outcome = orch.run("vivo", 60, true, budget, &log).await;

    assert_eq!(outcome.stats.fetch_attempts, 5);
    assert_eq!(pages.dispatch_offsets.lock().unwrap().len(), 5);
    assert_eq!(outcome.stats.halt, Some(HaltReason::FetchLimit));
    assert_eq!(outcome.documents.len(), 5, "the limit-reaching document is kept");
    assert_eq!(count_lines(&log, "FETCH_LIMIT_REACHED"), 1);
    // Two queries were needed to reach five fetches; no third search.
    assert_eq!(outcome.stats.queries_issued, 2);
}

#[tokio::test(start_paused = true)]
async fn no_fetch_starts_after_the_deadline() {
    let pages = Arc::new(FakePages {
        delay: Duration::from_secs(4),
        ..FakePages::default()
    });
    pages.start_clock();
    let orch = orchestrator(6, pages.clone(), 1);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(10), 50);

    let outcome = orch.run("vivo", 60, true, budget, &log).await;

    let offsets = pages.dispatch_offsets.lock().unwrap().clone();
    assert_eq!(offsets.len(), 3, "fetches at t=0s, 4s, 8s only");
    assert!(offsets.iter().all(|t| *t <= Duration::from_secs(10)));
    assert_eq!(outcome.stats.halt, Some(HaltReason::WallClock));
    assert_eq!(outcome.documents.len(), 3);
    assert_eq!(count_lines(&log, "TIME_BUDGET_REACHED"), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_respect_pool_size_and_budget() {
    let pages = Arc::new(FakePages {
        delay: Duration::from_secs(1),
        ..FakePages::default()
    });
    let orch = orchestrator(6, pages.clone(), 3);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 4);

    let outcome = orch.run("vivo", 60, true, budget, &log).await;

    assert_eq!(outcome.stats.fetch_attempts, 4);
    assert_eq!(pages.peak_active.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.documents.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn concurrent_results_keep_hit_order() {
    let pages = Arc::new(FakePages {
        delay: Duration::from_secs(3),
        fast_suffix: Some(("/2".to_string(), Duration::from_millis(10))),
        ..FakePages::default()
    });
    let orch = orchestrator(3, pages, 3);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 3);

    let outcome = orch.run("vivo", 60, false, budget, &log).await;

    let suffixes: Vec<&str> = outcome
        .documents
        .iter()
        .map(|d| d.url.rsplit('/').next().unwrap())
        .collect();
    assert_eq!(suffixes, vec!["0", "1", "2"]);
}

#[tokio::test(start_paused = true)]
async fn stale_documents_are_windowed_out_and_undated_kept() {
    let stale_url = "https://pages.example/vivo/4/1".to_string();
    let pages = Arc::new(FakePages {
        stale: HashSet::from([stale_url.clone()]),
        ..FakePages::default()
    });
    let orch = orchestrator(2, pages, 1);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 2);

    let outcome = orch.run("vivo", 30, false, budget, &log).await;

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.documents[0].url, "https://pages.example/vivo/4/0");
    assert_eq!(outcome.stats.window_skipped, 1);
    assert_eq!(count_lines(&log, "WINDOW_SKIP"), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_fetches_count_against_the_limit() {
    let pages = Arc::new(FakePages {
        fail_all: true,
        ..FakePages::default()
    });
    let orch = orchestrator(3, pages, 1);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 4);

    let outcome = orch.run("vivo", 60, true, budget, &log).await;

    assert!(outcome.documents.is_empty());
    assert_eq!(outcome.stats.fetch_attempts, 4);
    assert_eq!(outcome.stats.fetched, 0);
    assert_eq!(count_lines(&log, "FETCH_FAIL"), 4);
}

#[tokio::test(start_paused = true)]
async fn empty_search_results_issue_every_query_and_no_fetch() {
    let pages = Arc::new(FakePages::default());
    let orch = orchestrator(0, pages.clone(), 1);
    let log = RunLog::new("t");
    let budget = RunBudget::new(Duration::from_secs(25), 50);

    let outcome = orch.run("Acme X1", 60, true, budget, &log).await;

    assert!(outcome.documents.is_empty());
    assert_eq!(outcome.stats.queries_issued, outcome.stats.queries_planned);
    assert_eq!(outcome.stats.fetch_attempts, 0);
    assert_eq!(outcome.stats.halt, None);
    assert_eq!(
        count_lines(&log, "SEARCH"),
        outcome.stats.queries_planned
    );
    assert!(log
        .snapshot()
        .iter()
        .any(|line| line.contains("engine=none hits=0")));
}
