//! Health and service description handlers

use axum::Json;
use deepresearch_common::models::ResearchMode;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub available_modes: Vec<&'static str>,
    pub features: Vec<&'static str>,
}

/// Liveness check: always returns ok if server is running
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Service banner with the supported modes
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Deep Research API",
        version: deepresearch_common::VERSION,
        available_modes: ResearchMode::ALL.iter().map(ResearchMode::as_str).collect(),
        features: vec![
            "Deep research with o3-deep-research and o4-mini-deep-research models",
            "3-step prompting workflow (clarification, prompt rewriting, deep research)",
            "Combined web search and internal source research",
            "Web search only research",
            "Internal source only research",
            "Search and fetch tools for deep research models",
        ],
    })
}
