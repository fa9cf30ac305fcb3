//! Reference internal source backend
//!
//! Stand-in for the internal document server: a fixed corpus of
//! [`INTERNAL_DOCUMENT_COUNT`] documents addressed as `mcp_search_{n}`.
//! Implements both search and fetch.

use super::{FetchGateway, SearchGateway};
use crate::config::SourcesConfig;
use crate::errors::{AppError, Result};
use crate::models::{FetchResult, SearchResult, INTERNAL_URL_SCHEME};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

/// Number of documents in the reference corpus
pub const INTERNAL_DOCUMENT_COUNT: usize = 3;

const ID_PREFIX: &str = "mcp_search_";

pub struct ReferenceInternalSource {
    endpoint: String,
    search_latency: Duration,
    fetch_latency: Duration,
}

impl ReferenceInternalSource {
    pub fn new(config: &SourcesConfig) -> Self {
        Self {
            endpoint: format!("{}:{}", config.internal_host, config.internal_port),
            search_latency: Duration::from_millis(config.internal_search_latency_ms),
            fetch_latency: Duration::from_millis(config.internal_fetch_latency_ms),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Announce the source at startup. The reference corpus is in-process,
    /// so there is no connection to establish.
    pub async fn initialize(&self) -> Result<()> {
        tracing::info!(
            endpoint = %self.endpoint,
            documents = INTERNAL_DOCUMENT_COUNT,
            "Internal source ready"
        );
        Ok(())
    }

    /// Document number behind an id, if it names a document in the corpus
    fn document_number(id: &str) -> Option<usize> {
        id.strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=INTERNAL_DOCUMENT_COUNT).contains(n))
    }

    fn document_body(id: &str) -> String {
        format!(
            "This is the full content retrieved from the internal source for document {id}.\n\n\
             - Document Type: Internal Research Document\n\
             - Last Updated: 2025-01-25\n\
             - Source: Internal Document Store\n\n\
             This document contains detailed information relevant to the research query.\n\
             The content has been processed and structured for analysis.\n\n\
             - Internal Reference 1\n\
             - Internal Reference 2\n"
        )
    }
}

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl SearchGateway for ReferenceInternalSource {
    fn name(&self) -> &'static str {
        "reference-internal"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        simulate(self.search_latency).await;

        let results = (1..=max_results.min(INTERNAL_DOCUMENT_COUNT))
            .map(|i| SearchResult {
                id: format!("{}{}", ID_PREFIX, i),
                title: format!("Internal Search Result {}: {}", i, query),
                url: format!("{}internal/document_{}", INTERNAL_URL_SCHEME, i),
                snippet: format!(
                    "Internal document content related to '{}'. This represents data from a connected internal source.",
                    query
                ),
                relevance_score: Some((95 - 5 * i) as f64 / 100.0),
            })
            .collect();

        Ok(results)
    }
}

#[async_trait]
impl FetchGateway for ReferenceInternalSource {
    fn name(&self) -> &'static str {
        "reference-internal"
    }

    async fn fetch(&self, id: &str) -> Result<FetchResult> {
        simulate(self.fetch_latency).await;

        if Self::document_number(id).is_none() {
            return Err(AppError::SourceNotFound { id: id.to_string() });
        }

        let content = Self::document_body(id);
        let metadata = BTreeMap::from([
            ("source".to_string(), json!("internal_source")),
            ("document_type".to_string(), json!("internal_research")),
            ("last_updated".to_string(), json!("2025-01-25")),
            ("content_length".to_string(), json!(content.chars().count())),
        ]);

        Ok(FetchResult {
            id: id.to_string(),
            content,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> ReferenceInternalSource {
        ReferenceInternalSource::new(&SourcesConfig::default().without_latency())
    }

    #[tokio::test]
    async fn test_search_returns_internal_urls() {
        let results = source().search("contracts", 6).await.unwrap();

        assert_eq!(results.len(), INTERNAL_DOCUMENT_COUNT);
        assert!(results.iter().all(SearchResult::is_internal));
        assert_eq!(results[0].id, "mcp_search_1");
        assert_eq!(results[0].relevance_score, Some(0.9));
    }

    #[tokio::test]
    async fn test_fetch_known_document() {
        let doc = source().fetch("mcp_search_2").await.unwrap();

        assert_eq!(doc.id, "mcp_search_2");
        assert!(doc.content.contains("mcp_search_2"));
        assert_eq!(doc.metadata["content_length"], json!(doc.content.chars().count()));
        assert_eq!(doc.metadata["document_type"], json!("internal_research"));
    }

    #[tokio::test]
    async fn test_fetch_unknown_ids() {
        let source = source();
        for id in ["mcp_search_0", "mcp_search_4", "search_result_1", "mcp_search_x", ""] {
            let err = source.fetch(id).await.unwrap_err();
            assert!(err.is_not_found(), "expected not found for {:?}", id);
        }
    }

    #[test]
    fn test_endpoint_from_config() {
        assert_eq!(source().endpoint(), "localhost:8001");
    }
}
