//! `analyze` command handler.
//!
//! Plays the coordinator role around the pipeline: it picks the run id,
//! assembles the collaborators from configuration, and writes the report.
//! The pipeline itself never fails; only setup and output errors surface.

use std::path::PathBuf;
use std::sync::Arc;

use brandpulse_core::{AnalysisProfile, AppConfig};
use brandpulse_mentions::{
    ChatCompletionsClient, LanguageModel, MentionConfig, PipelineCoordinator, RunRequest,
};
use chrono::Utc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnalyzeArgs {
    pub brand: String,
    pub window_days: u32,
    pub expand_keywords: bool,
    pub run_id: String,
    pub output: Option<PathBuf>,
}

/// Time-derived run identifier, e.g. `20240610-153012-417`.
pub(crate) fn time_run_id() -> String {
    Utc::now().format("%Y%m%d-%H%M%S-%3f").to_string()
}

/// The YAML profile named by configuration, or the built-in one.
///
/// # Errors
///
/// Returns an error if the configured profile file cannot be read or is invalid.
pub(crate) fn load_effective_profile(config: &AppConfig) -> anyhow::Result<AnalysisProfile> {
    match &config.profile_path {
        Some(path) => Ok(brandpulse_core::load_profile(path)?),
        None => Ok(AnalysisProfile::default()),
    }
}

/// Language model collaborator, present only when an API key is configured.
fn build_language_model(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn LanguageModel>>> {
    let Some(api_key) = config.llm_api_key.as_deref() else {
        tracing::info!("LLM_API_KEY not set; translation disabled, synthesis is rule-based");
        return Ok(None);
    };
    let client = ChatCompletionsClient::new(
        &config.llm_api_url,
        api_key,
        &config.llm_model,
        config.llm_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build language model client: {e}"))?;
    Ok(Some(Arc::new(client)))
}

/// Run one pipeline and write its report as pretty JSON.
///
/// # Errors
///
/// Returns an error if the profile or HTTP clients cannot be set up, or the
/// report cannot be serialised or written.
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let profile = load_effective_profile(config)?;
    let mention_config = MentionConfig::from_app_config(config);
    let model = build_language_model(config)?;
    let pipeline = PipelineCoordinator::from_config(&mention_config, profile, model)
        .map_err(|e| anyhow::anyhow!("failed to build pipeline: {e}"))?;

    let request = RunRequest {
        run_id: args.run_id,
        brand: args.brand,
        window_days: args.window_days,
        expand_keywords: args.expand_keywords,
    };
    tracing::info!(
        run_id = %request.run_id,
        brand = %request.brand,
        window_days = request.window_days,
        "starting analysis run"
    );

    let report = pipeline.run(&request).await;
    tracing::info!(
        run_id = %report.run_id,
        mode = ?report.mode,
        documents = report.documents.len(),
        "analysis run finished"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
