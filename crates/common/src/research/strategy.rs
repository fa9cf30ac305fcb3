//! Per-mode research strategies
//!
//! | Strategy      | Search                       | Fetch                          |
//! |---------------|------------------------------|--------------------------------|
//! | ModelDriven   | none (delegated to the model) | none                          |
//! | Combined      | web (5) then internal (3)    | internal hits among first 3    |
//! | WebOnly       | web (8)                      | none                           |
//! | InternalOnly  | internal (6)                 | every hit                      |
//!
//! Strategies write into the shared [`RunState`] as they go, so whatever was
//! gathered before a failure survives into the run result.

use super::prompts;
use super::tracer::StepTracer;
use crate::errors::Result;
use crate::llm::{fallback_analysis, AnalysisOptions, TextService};
use crate::metrics;
use crate::models::{
    ClarificationResponse, FetchResult, PromptRewriteResponse, ResearchMode, SearchResult, StepType,
};
use crate::sources::{SourceKind, SourceSet};
use crate::tools::{ToolCatalog, ToolDefinition};
use serde_json::json;
use std::future::Future;
use std::time::{Duration, Instant};

pub const COMBINED_WEB_RESULTS: usize = 5;
pub const COMBINED_INTERNAL_RESULTS: usize = 3;
/// Fetch candidates are taken from this many leading combined results
pub const COMBINED_FETCH_WINDOW: usize = 3;
pub const WEB_ONLY_RESULTS: usize = 8;
pub const INTERNAL_ONLY_RESULTS: usize = 6;

/// Everything one run has produced so far
#[derive(Debug, Default)]
pub struct RunState {
    pub tracer: StepTracer,
    pub clarification: Option<ClarificationResponse>,
    pub prompt_rewrite: Option<PromptRewriteResponse>,
    pub search_results: Vec<SearchResult>,
    pub fetch_results: Vec<FetchResult>,
    pub final_analysis: String,
}

/// Collaborators and limits a strategy runs with
pub struct StrategyContext<'a> {
    pub mode: ResearchMode,
    pub sources: &'a SourceSet,
    pub text: &'a dyn TextService,
    pub options: AnalysisOptions,
    pub analysis_timeout: Duration,
}

impl StrategyContext<'_> {
    /// Run analysis under the analysis timeout. A timeout becomes the
    /// analysis text, like any other analysis failure.
    async fn analyze(&self, prompt: &str, tools: &[ToolDefinition]) -> String {
        let call = self.text.analyze(prompt, self.mode, tools, &self.options);

        match tokio::time::timeout(self.analysis_timeout, call).await {
            Ok(outcome) => {
                if let Some(reason) = outcome.fallback_reason() {
                    tracing::warn!(mode = %self.mode, reason, "Analysis returned an error description");
                }
                outcome.into_value()
            }
            Err(_) => {
                let reason = format!("analysis timed out after {}s", self.analysis_timeout.as_secs());
                tracing::warn!(mode = %self.mode, reason = %reason, "Analysis timed out");
                metrics::record_fallback("analyze");
                fallback_analysis(&reason)
            }
        }
    }
}

/// Research strategy for one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The analysis model searches and fetches through the declared tools
    ModelDriven,
    Combined,
    WebOnly,
    InternalOnly,
}

impl Strategy {
    pub fn for_mode(mode: ResearchMode) -> Self {
        match mode {
            ResearchMode::O3 | ResearchMode::O4Mini => Strategy::ModelDriven,
            ResearchMode::WebMcp => Strategy::Combined,
            ResearchMode::WebOnly => Strategy::WebOnly,
            ResearchMode::McpOnly => Strategy::InternalOnly,
        }
    }

    pub async fn execute(&self, ctx: &StrategyContext<'_>, prompt: &str, state: &mut RunState) -> Result<()> {
        match self {
            Strategy::ModelDriven => model_driven(ctx, prompt, state).await,
            Strategy::Combined => combined(ctx, prompt, state).await,
            Strategy::WebOnly => web_only(ctx, prompt, state).await,
            Strategy::InternalOnly => internal_only(ctx, prompt, state).await,
        }
    }
}

async fn model_driven(ctx: &StrategyContext<'_>, prompt: &str, state: &mut RunState) -> Result<()> {
    let tools = ToolCatalog::for_mode(ctx.mode);
    let tool_names: Vec<&str> = tools.iter().map(ToolDefinition::name).collect();

    let started = Instant::now();
    let analysis = ctx.analyze(prompt, &tools).await;
    state.tracer.record(
        StepType::Analysis,
        json!({ "prompt": prompt, "mode": ctx.mode.as_str(), "tools": tool_names }),
        json!({ "analysis": analysis }),
        started,
    );
    state.final_analysis = analysis;
    Ok(())
}

async fn combined(ctx: &StrategyContext<'_>, prompt: &str, state: &mut RunState) -> Result<()> {
    // The searches are independent; their steps are still recorded web first
    let (web, internal) = futures::join!(
        timed(ctx.sources.search(SourceKind::Web, prompt, COMBINED_WEB_RESULTS)),
        timed(ctx.sources.search(SourceKind::Internal, prompt, COMBINED_INTERNAL_RESULTS)),
    );

    record_search(state, prompt, "websearch", web.0?, web.1);
    record_search(state, prompt, "mcp", internal.0?, internal.1);

    let candidates: Vec<String> = state
        .search_results
        .iter()
        .take(COMBINED_FETCH_WINDOW)
        .filter(|result| result.is_internal())
        .map(|result| result.id.clone())
        .collect();

    for id in &candidates {
        fetch_into(ctx, state, id, "mcp").await?;
    }

    let analysis_prompt = prompts::combined_prompt(prompt, &state.search_results, &state.fetch_results);
    analyze_into(ctx, state, analysis_prompt).await;
    Ok(())
}

async fn web_only(ctx: &StrategyContext<'_>, prompt: &str, state: &mut RunState) -> Result<()> {
    let (results, elapsed) = timed(ctx.sources.search(SourceKind::Web, prompt, WEB_ONLY_RESULTS)).await;
    record_search(state, prompt, "websearch_only", results?, elapsed);

    let analysis_prompt = prompts::web_only_prompt(prompt, &state.search_results);
    analyze_into(ctx, state, analysis_prompt).await;
    Ok(())
}

async fn internal_only(ctx: &StrategyContext<'_>, prompt: &str, state: &mut RunState) -> Result<()> {
    let (results, elapsed) =
        timed(ctx.sources.search(SourceKind::Internal, prompt, INTERNAL_ONLY_RESULTS)).await;
    record_search(state, prompt, "mcp_only", results?, elapsed);

    let ids: Vec<String> = state.search_results.iter().map(|result| result.id.clone()).collect();
    for id in &ids {
        fetch_into(ctx, state, id, "mcp_only").await?;
    }

    let analysis_prompt = prompts::internal_only_prompt(prompt, &state.search_results, &state.fetch_results);
    analyze_into(ctx, state, analysis_prompt).await;
    Ok(())
}

async fn timed<T>(call: impl Future<Output = T>) -> (T, Duration) {
    let started = Instant::now();
    let output = call.await;
    (output, started.elapsed())
}

fn record_search(state: &mut RunState, query: &str, source: &str, results: Vec<SearchResult>, elapsed: Duration) {
    state.tracer.record_elapsed(
        StepType::Search,
        json!({ "query": query, "source": source }),
        json!({ "results_count": results.len() }),
        elapsed,
    );
    state.search_results.extend(results);
}

async fn fetch_into(ctx: &StrategyContext<'_>, state: &mut RunState, id: &str, source: &str) -> Result<()> {
    let started = Instant::now();
    let document = ctx.sources.fetch(id).await?;

    state.tracer.record(
        StepType::Fetch,
        json!({ "id": id, "source": source }),
        json!({ "content_length": document.content.chars().count() }),
        started,
    );
    state.fetch_results.push(document);
    Ok(())
}

async fn analyze_into(ctx: &StrategyContext<'_>, state: &mut RunState, analysis_prompt: String) {
    let started = Instant::now();
    let analysis = ctx.analyze(&analysis_prompt, &[]).await;

    state.tracer.record(
        StepType::Analysis,
        json!({ "prompt": analysis_prompt }),
        json!({ "analysis": analysis }),
        started,
    );
    state.final_analysis = analysis;
}
