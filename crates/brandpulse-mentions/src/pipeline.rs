//! End-to-end run: retrieval, analysis, synthesis, and the zero-document
//! fallbacks.

use std::sync::Arc;
use std::time::Duration;

use brandpulse_core::AnalysisProfile;
use chrono::Utc;

use crate::budget::RunBudget;
use crate::config::MentionConfig;
use crate::demo::demo_documents;
use crate::error::MentionError;
use crate::fetch::FetchClient;
use crate::insight::analyze;
use crate::llm::LanguageModel;
use crate::orchestrator::FetchOrchestrator;
use crate::run_log::RunLog;
use crate::search::SearchRouter;
use crate::synthesis::SynthesisEngine;
use crate::translate::{IdentityTranslator, LlmTranslator, Translator};
use crate::types::{Insights, RunMode, RunReport, SentimentTally, SynthesisResult, SynthesisSource};

pub const PLACEHOLDER_MESSAGE: &str =
    "No usable mentions were retrieved; retry later or change the keywords.";

/// Inputs for one run. The run id is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub run_id: String,
    pub brand: String,
    pub window_days: u32,
    pub expand_keywords: bool,
}

pub struct PipelineCoordinator {
    orchestrator: FetchOrchestrator,
    synthesis: SynthesisEngine,
    profile: Arc<AnalysisProfile>,
    demo_mode: bool,
    time_budget: Duration,
    max_fetches: usize,
}

impl PipelineCoordinator {
    #[must_use]
    pub fn new(
        orchestrator: FetchOrchestrator,
        synthesis: SynthesisEngine,
        profile: Arc<AnalysisProfile>,
        config: &MentionConfig,
    ) -> Self {
        Self {
            orchestrator,
            synthesis,
            profile,
            demo_mode: config.demo_mode,
            time_budget: Duration::from_secs(config.time_budget_secs),
            max_fetches: config.max_fetches,
        }
    }

    /// Wire the live HTTP search and fetch stack. Without a language model
    /// translation is the identity and synthesis is rule-based.
    ///
    /// # Errors
    ///
    /// Returns [`MentionError`] if an HTTP client or endpoint URL is invalid.
    pub fn from_config(
        config: &MentionConfig,
        profile: AnalysisProfile,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Result<Self, MentionError> {
        let profile = Arc::new(profile);
        let translator: Arc<dyn Translator> = match &model {
            Some(model) => Arc::new(LlmTranslator::new(Arc::clone(model))),
            None => Arc::new(IdentityTranslator),
        };

        let pages = Arc::new(FetchClient::new(config, Arc::clone(&profile), translator)?);
        let router = Arc::new(SearchRouter::with_default_backends(config)?);
        let orchestrator = FetchOrchestrator::new(router, pages, Arc::clone(&profile), config);

        Ok(Self::new(
            orchestrator,
            SynthesisEngine::new(model),
            profile,
            config,
        ))
    }

    /// Run the full pipeline. Always produces a report; budget exhaustion
    /// and empty retrieval are handled, not surfaced.
    pub async fn run(&self, request: &RunRequest) -> RunReport {
        let log = RunLog::new(request.run_id.clone());
        let brand = request.brand.trim();

        log.push(format!(
            "[query] START brand='{brand}' window_days={} expand={}",
            request.window_days, request.expand_keywords
        ));
        let budget = RunBudget::new(self.time_budget, self.max_fetches);
        let outcome = self
            .orchestrator
            .run(
                brand,
                request.window_days,
                request.expand_keywords,
                budget,
                &log,
            )
            .await;
        log.push(format!(
            "[query] DONE docs={} queries={}/{} fetches={}",
            outcome.documents.len(),
            outcome.stats.queries_issued,
            outcome.stats.queries_planned,
            outcome.stats.fetch_attempts
        ));

        let (mode, documents) = if !outcome.documents.is_empty() {
            (RunMode::Live, outcome.documents)
        } else if self.demo_mode {
            log.push("[query] no documents retrieved, using demo dataset");
            (
                RunMode::Demo,
                demo_documents(brand, Utc::now().date_naive()),
            )
        } else {
            log.push("[query] no documents retrieved, emitting placeholder");
            return self.placeholder(request, brand, log);
        };

        let insights = analyze(&documents, &self.profile);
        log.push(format!(
            "[insight] keywords={} clusters={} positive={} negative={} neutral={}",
            insights.keywords.len(),
            insights.clusters.len(),
            insights.sentiment.positive,
            insights.sentiment.negative,
            insights.sentiment.neutral
        ));

        let synthesis = self.synthesis.summarize(brand, &insights).await;
        log.push(format!(
            "[synthesis] source={:?} core_points={}",
            synthesis.source,
            synthesis.core_points.len()
        ));

        RunReport {
            run_id: request.run_id.clone(),
            brand: brand.to_string(),
            window_days: request.window_days,
            mode,
            documents,
            insights,
            synthesis,
            logs: log.into_lines(),
        }
    }

    fn placeholder(&self, request: &RunRequest, brand: &str, log: RunLog) -> RunReport {
        tracing::info!(run_id = %request.run_id, brand, demo_mode = self.demo_mode, "run produced no documents");
        RunReport {
            run_id: request.run_id.clone(),
            brand: brand.to_string(),
            window_days: request.window_days,
            mode: RunMode::Placeholder,
            documents: Vec::new(),
            insights: Insights::default(),
            synthesis: SynthesisResult {
                brand: brand.to_string(),
                core_points: vec![PLACEHOLDER_MESSAGE.to_string()],
                risk: Vec::new(),
                advice: Vec::new(),
                sentiment: SentimentTally::default(),
                source: SynthesisSource::Placeholder,
            },
            logs: log.into_lines(),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
