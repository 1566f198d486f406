//! Brand mention pipeline.
//!
//! Expands a brand into search queries, routes them across public search
//! engines, fetches and normalises result pages under a wall-clock and
//! fetch-count budget, removes near-duplicates, and turns what is left into
//! keyword, topic, sentiment, trend and channel statistics plus a short
//! summary.

pub mod budget;
pub mod config;
pub mod dedup;
pub mod demo;
pub mod error;
pub mod fetch;
pub mod insight;
pub mod llm;
pub mod orchestrator;
pub mod pipeline;
pub mod run_log;
pub mod search;
pub mod synthesis;
pub mod text;
pub mod translate;
pub mod types;

pub use budget::{HaltReason, RunBudget};
pub use config::MentionConfig;
pub use error::{FetchError, MentionError};
pub use fetch::{FetchClient, PageSource, SiteSpecificExtractor};
pub use llm::{ChatCompletionsClient, LanguageModel};
pub use orchestrator::{build_query_plan, FetchOrchestrator, QueryPlan, RunStats};
pub use pipeline::{PipelineCoordinator, RunRequest};
pub use run_log::RunLog;
pub use search::{SearchBackend, SearchRouter};
pub use synthesis::SynthesisEngine;
pub use translate::{IdentityTranslator, LlmTranslator, Translator};
pub use types::{
    Cluster, Document, Insights, RunMode, RunReport, SearchHit, SentimentTally, SynthesisResult,
    SynthesisSource, TrendPoint,
};
