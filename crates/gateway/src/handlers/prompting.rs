//! Clarification and prompt rewriting handlers

use axum::{extract::State, Json};
use deepresearch_common::models::{
    ClarificationResponse, ClarifyRequest, PromptRewriteResponse, RewritePromptRequest,
};

use crate::extract::ValidatedJson;
use crate::AppState;

/// Step 1 of the prompting workflow: clarifying questions for a query.
/// Always answers, falling back to generic questions when generation fails.
pub async fn clarify(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ClarifyRequest>,
) -> Json<ClarificationResponse> {
    Json(state.orchestrator.clarify(&request.query).await)
}

/// Step 2 of the prompting workflow: rewrite using the user's answers
pub async fn rewrite_prompt(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RewritePromptRequest>,
) -> Json<PromptRewriteResponse> {
    Json(
        state
            .orchestrator
            .rewrite(&request.original_query, &request.clarification_with_answers)
            .await,
    )
}
