//! Query expansion and the budget-bounded search-then-fetch loop.

use std::sync::{Arc, LazyLock};

use brandpulse_core::profile::BRAND_PLACEHOLDER;
use brandpulse_core::AnalysisProfile;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use futures::stream::{FuturesOrdered, StreamExt};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::budget::{HaltReason, RunBudget};
use crate::config::MentionConfig;
use crate::dedup::dedup;
use crate::fetch::PageSource;
use crate::run_log::RunLog;
use crate::search::{is_directed, SearchRouter};
use crate::types::{Document, SearchHit};

const PER_QUERY_CEILING: usize = 6;
const DIRECTED_PER_QUERY_CEILING: usize = 3;
const DIRECTED_MAX_RESULTS: usize = 30;

static LETTERS_THEN_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)(\d+)").expect("valid letters-then-digits regex")
});

/// Queries to issue for one run and how many hits to take from each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub queries: Vec<String>,
    pub directed: bool,
    pub max_results: usize,
    pub per_query_cap: usize,
}

/// Split a letters-then-digits run (`X100` becomes `X 100`) and tidy spacing.
#[must_use]
pub fn normalize_brand(brand: &str) -> String {
    let spaced = LETTERS_THEN_DIGITS.replace_all(brand.trim(), "$1 $2");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-case the first cased letter of each word, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}

/// Expand a brand into the ordered, de-duplicated query list: spelling
/// variants first, then topic and per-platform expansions.
///
/// A brand containing `site:` is used as-is: expansion is disabled and the
/// result budget tightened.
#[must_use]
pub fn build_query_plan(
    brand: &str,
    expand_keywords: bool,
    max_results: usize,
    profile: &AnalysisProfile,
) -> QueryPlan {
    let raw = brand.trim();
    let normalized = normalize_brand(raw);
    let directed = is_directed(&normalized);

    let mut candidates = vec![
        normalized.clone(),
        raw.to_string(),
        normalized.replace(' ', ""),
        title_case(&normalized),
        raw.to_uppercase(),
    ];

    if expand_keywords && !directed {
        candidates.extend(
            profile
                .topic_terms
                .iter()
                .map(|term| format!("{normalized} {term}")),
        );
        candidates.extend(
            profile
                .directed_templates
                .iter()
                .map(|template| template.replace(BRAND_PLACEHOLDER, &normalized)),
        );
    }

    let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !queries.contains(&candidate) {
            queries.push(candidate);
        }
    }

    let (max_results, ceiling) = if directed {
        (max_results.min(DIRECTED_MAX_RESULTS), DIRECTED_PER_QUERY_CEILING)
    } else {
        (max_results, PER_QUERY_CEILING)
    };
    let per_query_cap = (max_results / queries.len().max(1)).clamp(1, ceiling);

    QueryPlan {
        queries,
        directed,
        max_results,
        per_query_cap,
    }
}

/// Counters describing how a retrieval pass went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub queries_planned: usize,
    pub queries_issued: usize,
    pub fetch_attempts: usize,
    pub fetched: usize,
    pub window_skipped: usize,
    pub duplicates_removed: usize,
    pub halt: Option<HaltReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOutcome {
    /// Deduplicated, in-window documents in retrieval order.
    pub documents: Vec<Document>,
    pub stats: RunStats,
}

/// Drives query expansion, search, fetching and windowing under a budget.
pub struct FetchOrchestrator {
    router: Arc<SearchRouter>,
    pages: Arc<dyn PageSource>,
    profile: Arc<AnalysisProfile>,
    max_results: usize,
    fetch_concurrency: usize,
    dedup_threshold: u32,
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(
        router: Arc<SearchRouter>,
        pages: Arc<dyn PageSource>,
        profile: Arc<AnalysisProfile>,
        config: &MentionConfig,
    ) -> Self {
        Self {
            router,
            pages,
            profile,
            max_results: config.max_results,
            fetch_concurrency: config.fetch_concurrency.max(1),
            dedup_threshold: config.dedup_threshold,
        }
    }

    /// Run one retrieval pass. Never fails; budget exhaustion returns what
    /// was gathered so far.
    pub async fn run(
        &self,
        brand: &str,
        window_days: u32,
        expand_keywords: bool,
        mut budget: RunBudget,
        log: &RunLog,
    ) -> OrchestratorOutcome {
        let plan = build_query_plan(brand, expand_keywords, self.max_results, &self.profile);
        let cutoff = Utc::now().date_naive() - ChronoDuration::days(i64::from(window_days));
        log.push(format!(
            "PLAN queries={} directed={} per_query={} window_start={cutoff}",
            plan.queries.len(),
            plan.directed,
            plan.per_query_cap
        ));

        let mut stats = RunStats {
            queries_planned: plan.queries.len(),
            ..RunStats::default()
        };
        let mut accepted = Vec::new();

        for query in &plan.queries {
            if let Some(reason) = budget.check() {
                halt(&budget, reason, log);
                stats.halt = Some(reason);
                break;
            }

            let hits = self.router.search(query, plan.per_query_cap).await;
            stats.queries_issued += 1;
            let engine = hits.first().map_or("none", |hit| hit.engine.as_str());
            log.push(format!(
                "SEARCH q='{query}' engine={engine} hits={}",
                hits.len()
            ));

            let halted = self
                .fetch_hits(hits, &mut budget, cutoff, log, &mut accepted, &mut stats)
                .await;
            if let Some(reason) = halted {
                stats.halt = Some(reason);
                break;
            }
        }

        stats.fetch_attempts = budget.fetches();
        let before = accepted.len();
        let documents = dedup(accepted, self.dedup_threshold);
        stats.duplicates_removed = before - documents.len();
        log.push(format!(
            "RETRIEVAL_DONE docs={} fetches={} duplicates={} elapsed={:.1}s",
            documents.len(),
            stats.fetch_attempts,
            stats.duplicates_removed,
            budget.elapsed().as_secs_f64()
        ));

        OrchestratorOutcome { documents, stats }
    }

    /// Fetch one query's hits with bounded concurrency, reserving a budget
    /// slot before each dispatch. In-flight fetches are allowed to finish.
    async fn fetch_hits(
        &self,
        hits: Vec<SearchHit>,
        budget: &mut RunBudget,
        cutoff: NaiveDate,
        log: &RunLog,
        accepted: &mut Vec<Document>,
        stats: &mut RunStats,
    ) -> Option<HaltReason> {
        let pages = &*self.pages;
        let mut pending = hits.into_iter().filter(|hit| !hit.url.trim().is_empty());
        let mut in_flight = FuturesOrdered::new();
        let mut halted = None;

        loop {
            while halted.is_none() && in_flight.len() < self.fetch_concurrency {
                if let Some(reason) = budget.check() {
                    halt(budget, reason, log);
                    halted = Some(reason);
                    break;
                }
                let Some(hit) = pending.next() else {
                    break;
                };
                budget.record_fetch();
                in_flight.push_back(async move { pages.fetch(&hit.url, log).await });
            }

            let Some(result) = in_flight.next().await else {
                break;
            };
            let Ok(doc) = result else {
                continue;
            };
            stats.fetched += 1;

            match doc.published {
                Some(published) if published < cutoff => {
                    stats.window_skipped += 1;
                    log.push(format!("WINDOW_SKIP {} published={published}", doc.url));
                }
                _ => accepted.push(doc),
            }
        }

        halted
    }
}

fn halt(budget: &RunBudget, reason: HaltReason, log: &RunLog) {
    match reason {
        HaltReason::WallClock => log.push(format!(
            "TIME_BUDGET_REACHED elapsed={:.1}s fetches={}",
            budget.elapsed().as_secs_f64(),
            budget.fetches()
        )),
        HaltReason::FetchLimit => log.push(format!(
            "FETCH_LIMIT_REACHED limit={}",
            budget.fetch_limit()
        )),
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
