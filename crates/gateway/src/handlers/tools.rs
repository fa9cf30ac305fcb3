//! Tool catalog handlers

use axum::{extract::State, Json};
use deepresearch_common::{
    errors::Result,
    tools::{ToolCall, ToolCatalog, ToolDefinition},
};
use serde::Serialize;
use serde_json::Value;

use crate::extract::ValidatedJson;
use crate::AppState;

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
    pub note: &'static str,
}

/// The tool definitions deep research models can call
pub async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: ToolCatalog::all(),
        note: "Deep research models (o3-deep-research, o4-mini-deep-research) only access search and fetch tools",
    })
}

/// Execute one tool call against the configured sources
pub async fn call_tool(
    State(state): State<AppState>,
    ValidatedJson(call): ValidatedJson<ToolCall>,
) -> Result<Json<Value>> {
    Ok(Json(state.tools.execute(&call).await?))
}
