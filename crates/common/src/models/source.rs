//! Search and fetch result types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// URL scheme that marks a result as coming from an internal source
pub const INTERNAL_URL_SCHEME: &str = "mcp://";

/// A single ranked hit. `id` is unique within one search call only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

impl SearchResult {
    /// Whether the full document can be retrieved from the internal fetch backend
    pub fn is_internal(&self) -> bool {
        self.url.starts_with(INTERNAL_URL_SCHEME)
    }
}

/// Full content for a previously returned [`SearchResult::id`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

fn default_max_results() -> usize { 10 }
fn default_include_citations() -> bool { true }

/// Body of `/websearch`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WebSearchRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 50))]
    pub max_results: usize,
    #[serde(default = "default_include_citations")]
    pub include_citations: bool,
}

/// Body of `/mcp/search`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceSearchRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 50))]
    pub max_results: usize,
}

/// Body of `/mcp/fetch`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceFetchRequest {
    #[validate(length(min = 1, max = 512))]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_scheme_detection() {
        let mut result = SearchResult {
            id: "mcp_search_1".into(),
            title: "Quarterly report".into(),
            url: "mcp://internal/document_1".into(),
            snippet: "...".into(),
            relevance_score: Some(0.9),
        };
        assert!(result.is_internal());

        result.url = "https://example.com/mcp://internal".into();
        assert!(!result.is_internal());
    }

    #[test]
    fn test_search_request_defaults() {
        let body: WebSearchRequest =
            serde_json::from_value(serde_json::json!({ "query": "solar" })).unwrap();
        assert_eq!(body.max_results, 10);
        assert!(body.include_citations);
        assert!(body.validate().is_ok());

        let body: SourceSearchRequest =
            serde_json::from_value(serde_json::json!({ "query": "solar", "max_results": 0 })).unwrap();
        assert!(body.validate().is_err());
    }
}
