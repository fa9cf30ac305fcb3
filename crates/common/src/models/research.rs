//! Research run request, trace, and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::{ClarificationResponse, FetchResult, PromptRewriteResponse, SearchResult};
use crate::errors::AppError;

/// Research strategy selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchMode {
    /// Model-driven deep research on the o3 deep research model
    #[serde(rename = "o3-deep-research")]
    O3,
    /// Model-driven deep research on the o4-mini deep research model
    #[serde(rename = "o4-mini-deep-research")]
    O4Mini,
    /// Web search plus internal sources, synthesised together
    #[serde(rename = "websearch-mcp")]
    WebMcp,
    /// Web search only
    #[serde(rename = "websearch-only")]
    WebOnly,
    /// Internal sources only
    #[serde(rename = "mcp-only")]
    McpOnly,
}

impl ResearchMode {
    pub const ALL: [ResearchMode; 5] = [
        ResearchMode::O3,
        ResearchMode::O4Mini,
        ResearchMode::WebMcp,
        ResearchMode::WebOnly,
        ResearchMode::McpOnly,
    ];

    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchMode::O3 => "o3-deep-research",
            ResearchMode::O4Mini => "o4-mini-deep-research",
            ResearchMode::WebMcp => "websearch-mcp",
            ResearchMode::WebOnly => "websearch-only",
            ResearchMode::McpOnly => "mcp-only",
        }
    }

    /// Model-driven modes hand the tool catalog to the analysis model instead
    /// of calling the search and fetch gateways themselves.
    pub fn is_model_driven(&self) -> bool {
        matches!(self, ResearchMode::O3 | ResearchMode::O4Mini)
    }
}

impl fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ResearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| AppError::InvalidMode {
                value: value.to_string(),
                expected: ResearchMode::ALL
                    .iter()
                    .map(ResearchMode::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// How much tool use a model-driven run may spend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Fast,
    #[default]
    Medium,
    Deep,
}

impl ResearchDepth {
    pub const ALL: [ResearchDepth; 3] = [ResearchDepth::Fast, ResearchDepth::Medium, ResearchDepth::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchDepth::Fast => "fast",
            ResearchDepth::Medium => "medium",
            ResearchDepth::Deep => "deep",
        }
    }

    /// Tool-call budget handed to the deep research model
    pub fn max_tool_calls(&self) -> u32 {
        match self {
            ResearchDepth::Fast => 5,
            ResearchDepth::Medium => 15,
            ResearchDepth::Deep => 30,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResearchDepth::Fast => "Quick research with few tool calls; lowest cost and latency",
            ResearchDepth::Medium => "Balanced research depth for most questions",
            ResearchDepth::Deep => "Exhaustive research; highest cost and latency",
        }
    }
}

fn default_max_tokens() -> u32 { 4000 }
fn default_temperature() -> f32 { 0.7 }
fn default_true() -> bool { true }

/// Input to one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResearchRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,

    pub mode: ResearchMode,

    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 100000))]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,

    #[serde(default = "default_true")]
    pub include_clarification: bool,

    #[serde(default = "default_true")]
    pub include_prompt_rewriting: bool,

    #[serde(default)]
    pub research_depth: ResearchDepth,

    /// Overrides the depth's tool-call budget when set
    #[serde(default)]
    #[validate(range(min = 1, max = 200))]
    pub max_tool_calls: Option<u32>,
}

impl ResearchRequest {
    /// Request with the documented defaults: both prompting stages enabled
    pub fn new(query: impl Into<String>, mode: ResearchMode) -> Self {
        Self {
            query: query.into(),
            mode,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            include_clarification: true,
            include_prompt_rewriting: true,
            research_depth: ResearchDepth::default(),
            max_tool_calls: None,
        }
    }

    /// Disable clarification and rewriting; the query goes straight to research
    pub fn direct(mut self) -> Self {
        self.include_clarification = false;
        self.include_prompt_rewriting = false;
        self
    }

    pub fn effective_max_tool_calls(&self) -> u32 {
        self.max_tool_calls
            .unwrap_or_else(|| self.research_depth.max_tool_calls())
    }
}

fn default_analysis_mode() -> ResearchMode { ResearchMode::O3 }

/// Body of `/research-analysis`: the research stage only, on an already
/// rewritten prompt
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResearchAnalysisRequest {
    #[validate(length(min = 1, max = 20000))]
    pub rewritten_prompt: String,

    #[serde(default = "default_analysis_mode")]
    pub mode: ResearchMode,

    #[serde(default)]
    pub research_depth: ResearchDepth,

    #[serde(default)]
    #[validate(range(min = 1, max = 200))]
    pub max_tool_calls: Option<u32>,
}

impl From<ResearchAnalysisRequest> for ResearchRequest {
    fn from(request: ResearchAnalysisRequest) -> Self {
        let mut research = ResearchRequest::new(request.rewritten_prompt, request.mode).direct();
        research.research_depth = request.research_depth;
        research.max_tool_calls = request.max_tool_calls;
        research
    }
}

/// Pipeline stage a trace step records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Clarification,
    PromptRewriting,
    Search,
    Fetch,
    Analysis,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Clarification => "clarification",
            StepType::PromptRewriting => "prompt_rewriting",
            StepType::Search => "search",
            StepType::Fetch => "fetch",
            StepType::Analysis => "analysis",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a run's append-only trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchStep {
    pub step_type: StepType,
    pub input_data: Map<String, Value>,
    pub output_data: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Terminal artifact of a run; exactly one per request, failed or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    pub mode: ResearchMode,
    pub clarification: Option<ClarificationResponse>,
    pub prompt_rewrite: Option<PromptRewriteResponse>,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default)]
    pub fetch_results: Vec<FetchResult>,
    pub final_analysis: String,
    #[serde(default)]
    pub steps: Vec<ResearchStep>,
    pub total_duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl ResearchResult {
    /// Step types in execution order
    pub fn step_types(&self) -> Vec<StepType> {
        self.steps.iter().map(|step| step.step_type).collect()
    }

    pub fn steps_of(&self, step_type: StepType) -> impl Iterator<Item = &ResearchStep> {
        self.steps.iter().filter(move |step| step.step_type == step_type)
    }
}
