//! Research run orchestration

use super::strategy::{RunState, Strategy, StrategyContext};
use crate::config::LlmConfig;
use crate::errors::Result;
use crate::llm::{fallback_clarification, fallback_rewrite, AnalysisOptions, Outcome, TextService};
use crate::metrics;
use crate::models::{
    ClarificationResponse, ClarificationWithAnswers, PromptRewriteResponse, ResearchMode,
    ResearchRequest, ResearchResult, StepType,
};
use crate::sources::SourceSet;
use futures::FutureExt;
use serde_json::json;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Upper bounds for text service calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Clarification, rewriting and gateway-driven synthesis
    pub short: Duration,
    /// Model-driven deep research
    pub deep_research: Duration,
}

impl Timeouts {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            short: config.request_timeout(),
            deep_research: config.deep_research_timeout(),
        }
    }

    pub fn analysis_for(&self, mode: ResearchMode) -> Duration {
        if mode.is_model_driven() {
            self.deep_research
        } else {
            self.short
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Runs research requests end to end
#[derive(Clone)]
pub struct ResearchOrchestrator {
    text: Arc<dyn TextService>,
    sources: SourceSet,
    timeouts: Timeouts,
}

impl ResearchOrchestrator {
    pub fn new(text: Arc<dyn TextService>, sources: SourceSet, timeouts: Timeouts) -> Self {
        Self {
            text,
            sources,
            timeouts,
        }
    }

    pub fn text(&self) -> &Arc<dyn TextService> {
        &self.text
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Execute one run. Never fails: errors and panics become a result with
    /// `success = false`, keeping every step and result gathered before the
    /// failure.
    pub async fn run(&self, request: &ResearchRequest) -> ResearchResult {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research_run", %run_id, mode = %request.mode);

        async move {
            let started = Instant::now();
            tracing::info!(
                include_clarification = request.include_clarification,
                include_prompt_rewriting = request.include_prompt_rewriting,
                "Research run started"
            );

            let mut state = RunState::default();
            let outcome = AssertUnwindSafe(self.execute(request, &mut state))
                .catch_unwind()
                .await;

            let error_message = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic) => Some(panic_message(&*panic)),
            };

            let elapsed = started.elapsed();
            let success = error_message.is_none();
            metrics::record_run(request.mode.as_str(), elapsed.as_secs_f64(), success);

            match &error_message {
                None => tracing::info!(
                    steps = state.tracer.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Research run completed"
                ),
                Some(message) => tracing::error!(
                    steps = state.tracer.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    error = %message,
                    "Research run failed"
                ),
            }

            ResearchResult {
                query: request.query.clone(),
                mode: request.mode,
                clarification: state.clarification,
                prompt_rewrite: state.prompt_rewrite,
                search_results: state.search_results,
                fetch_results: state.fetch_results,
                final_analysis: state.final_analysis,
                steps: state.tracer.into_steps(),
                total_duration_ms: elapsed.as_millis() as u64,
                success,
                error_message,
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, request: &ResearchRequest, state: &mut RunState) -> Result<()> {
        let query = request.query.as_str();

        if request.include_clarification {
            let started = Instant::now();
            let clarification = self.clarify(query).await;
            state.tracer.record(
                StepType::Clarification,
                json!({ "query": query }),
                serde_json::to_value(&clarification)?,
                started,
            );
            state.clarification = Some(clarification);
        }

        let mut prompt = request.query.clone();
        if request.include_prompt_rewriting {
            let context = match &state.clarification {
                Some(clarification) => ClarificationWithAnswers::from(clarification.clone()),
                None => ClarificationWithAnswers::unclarified(query),
            };

            let started = Instant::now();
            let rewrite = self.rewrite(query, &context).await;
            state.tracer.record(
                StepType::PromptRewriting,
                json!({ "original_query": query, "clarification": state.clarification }),
                serde_json::to_value(&rewrite)?,
                started,
            );
            prompt = rewrite.rewritten_prompt.clone();
            state.prompt_rewrite = Some(rewrite);
        }

        let ctx = StrategyContext {
            mode: request.mode,
            sources: &self.sources,
            text: self.text.as_ref(),
            options: AnalysisOptions {
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                max_tool_calls: request.effective_max_tool_calls(),
            },
            analysis_timeout: self.timeouts.analysis_for(request.mode),
        };

        Strategy::for_mode(request.mode).execute(&ctx, &prompt, state).await
    }

    /// Clarify under the short timeout
    pub async fn clarify(&self, query: &str) -> ClarificationResponse {
        self.bounded("clarify", self.text.clarify(query), fallback_clarification)
            .await
    }

    /// Rewrite under the short timeout
    pub async fn rewrite(&self, query: &str, context: &ClarificationWithAnswers) -> PromptRewriteResponse {
        self.bounded("rewrite", self.text.rewrite(query, context), || fallback_rewrite(query))
            .await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Outcome<T>>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match tokio::time::timeout(self.timeouts.short, call).await {
            Ok(outcome) => {
                if let Some(reason) = outcome.fallback_reason() {
                    tracing::warn!(operation, reason, "Using fallback");
                }
                outcome.into_value()
            }
            Err(_) => {
                tracing::warn!(operation, timeout_secs = self.timeouts.short.as_secs(), "Timed out, using fallback");
                metrics::record_fallback(operation);
                fallback()
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Internal error: {}", detail)
}
