//! Research handlers

use axum::{extract::State, Json};
use deepresearch_common::models::{
    ResearchAnalysisRequest, ResearchDepth, ResearchMode, ResearchRequest, ResearchResult,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::extract::ValidatedJson;
use crate::AppState;

/// Run the full pipeline for one request.
///
/// A failed run is still a 200 with `success = false`. The run is polled in
/// the request task, so a client that disconnects cancels it.
pub async fn research(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResearchRequest>,
) -> Json<ResearchResult> {
    Json(state.orchestrator.run(&request).await)
}

/// Research stage only, on an already rewritten prompt
pub async fn research_analysis(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResearchAnalysisRequest>,
) -> Json<ResearchResult> {
    let request = ResearchRequest::from(request);
    Json(state.orchestrator.run(&request).await)
}

#[derive(Serialize)]
pub struct ModeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: Vec<&'static str>,
    pub workflow: &'static str,
}

#[derive(Serialize)]
pub struct ModesResponse {
    pub modes: BTreeMap<&'static str, ModeInfo>,
}

fn describe(mode: ResearchMode) -> ModeInfo {
    match mode {
        ResearchMode::O3 => ModeInfo {
            name: "Deep Research O3",
            description: "Uses the o3-deep-research model with search and fetch tools",
            capabilities: vec!["web_search", "internal_search", "internal_fetch"],
            workflow: "3-step prompting (clarification, rewriting, research)",
        },
        ResearchMode::O4Mini => ModeInfo {
            name: "Deep Research O4 Mini",
            description: "Uses the o4-mini-deep-research model with search and fetch tools",
            capabilities: vec!["web_search", "internal_search", "internal_fetch"],
            workflow: "3-step prompting (clarification, rewriting, research)",
        },
        ResearchMode::WebMcp => ModeInfo {
            name: "Web Search + Internal Sources",
            description: "Combined research over web search and internal sources",
            capabilities: vec!["web_search", "internal_search", "internal_fetch", "synthesis"],
            workflow: "3-step prompting plus combined source analysis",
        },
        ResearchMode::WebOnly => ModeInfo {
            name: "Web Search Only",
            description: "Research using web search only",
            capabilities: vec!["web_search", "web_analysis"],
            workflow: "3-step prompting plus web-focused research",
        },
        ResearchMode::McpOnly => ModeInfo {
            name: "Internal Sources Only",
            description: "Research using internal sources only",
            capabilities: vec!["internal_search", "internal_fetch", "internal_analysis"],
            workflow: "3-step prompting plus internal source analysis",
        },
    }
}

pub async fn research_modes() -> Json<ModesResponse> {
    Json(ModesResponse {
        modes: ResearchMode::ALL
            .into_iter()
            .map(|mode| (mode.as_str(), describe(mode)))
            .collect(),
    })
}

#[derive(Serialize)]
pub struct DepthOption {
    pub max_tool_calls: u32,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct DepthOptionsResponse {
    pub depth_options: BTreeMap<&'static str, DepthOption>,
    pub default: &'static str,
    pub description: &'static str,
}

pub async fn research_depth_options() -> Json<DepthOptionsResponse> {
    Json(DepthOptionsResponse {
        depth_options: ResearchDepth::ALL
            .into_iter()
            .map(|depth| {
                (
                    depth.as_str(),
                    DepthOption {
                        max_tool_calls: depth.max_tool_calls(),
                        description: depth.description(),
                    },
                )
            })
            .collect(),
        default: ResearchDepth::default().as_str(),
        description: "Research depth options trading cost and latency against thoroughness",
    })
}
