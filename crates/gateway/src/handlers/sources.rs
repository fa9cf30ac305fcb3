//! Direct pass-through to the search and fetch gateways

use axum::{extract::State, Json};
use deepresearch_common::{
    errors::Result,
    models::{FetchResult, SearchResult, SourceFetchRequest, SourceSearchRequest, WebSearchRequest},
    sources::SourceKind,
};

use crate::extract::ValidatedJson;
use crate::AppState;

pub async fn web_search(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<WebSearchRequest>,
) -> Result<Json<Vec<SearchResult>>> {
    let results = state
        .orchestrator
        .sources()
        .search(SourceKind::Web, &request.query, request.max_results)
        .await?;
    Ok(Json(results))
}

pub async fn internal_search(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SourceSearchRequest>,
) -> Result<Json<Vec<SearchResult>>> {
    let results = state
        .orchestrator
        .sources()
        .search(SourceKind::Internal, &request.query, request.max_results)
        .await?;
    Ok(Json(results))
}

/// Unknown ids answer 404
pub async fn internal_fetch(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SourceFetchRequest>,
) -> Result<Json<FetchResult>> {
    Ok(Json(state.orchestrator.sources().fetch(&request.id).await?))
}
