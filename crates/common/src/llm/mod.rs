//! Text generation collaborators
//!
//! [`TextService`] is the capability set the orchestrator uses for
//! clarification, prompt rewriting and analysis. None of its operations fail:
//! when the underlying generator is unavailable they return an
//! [`Outcome::Fallback`] carrying a usable value and the reason.

mod client;
mod fallback;
mod prompts;

pub use client::OpenAiTextService;
pub use fallback::{
    fallback_analysis, fallback_clarification, fallback_rewrite, FALLBACK_REWRITE_REASONING,
};
pub use prompts::{build_clarification_prompt, build_rewrite_prompt, RESEARCH_SYSTEM_PROMPT};

use crate::models::{
    ClarificationResponse, ClarificationWithAnswers, PromptRewriteResponse, ResearchMode,
};
use crate::tools::ToolDefinition;
use async_trait::async_trait;

/// Result of a text service call that never fails
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The generator produced the value
    Ok(T),
    /// The generator failed; `value` is the canned substitute
    Fallback { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Outcome::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Generation parameters for one analysis call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Tool-call budget for model-driven research
    pub max_tool_calls: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.7,
            max_tool_calls: 15,
        }
    }
}

/// Trait for the clarification, rewriting and analysis generators
#[async_trait]
pub trait TextService: Send + Sync {
    /// Derive clarifying questions and a clarified intent for `query`
    async fn clarify(&self, query: &str) -> Outcome<ClarificationResponse>;

    /// Rewrite `original_query` into a detailed research prompt, using any
    /// answered clarification questions as context
    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> Outcome<PromptRewriteResponse>;

    /// Produce the final analysis. On failure the value is a readable error
    /// description that callers use verbatim.
    async fn analyze(
        &self,
        prompt: &str,
        mode: ResearchMode,
        tools: &[ToolDefinition],
        options: &AnalysisOptions,
    ) -> Outcome<String>;
}
