//! Reference web search backend
//!
//! Deterministic stand-in for a real web search provider. Results are shaped
//! like provider output so the rest of the pipeline can be exercised end to
//! end without network access.

use super::SearchGateway;
use crate::errors::Result;
use crate::models::SearchResult;
use async_trait::async_trait;
use std::time::Duration;

/// Most results the reference backend will ever return for one query
const MAX_WEB_RESULTS: usize = 5;

pub struct ReferenceWebSearch {
    latency: Duration,
}

impl ReferenceWebSearch {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl SearchGateway for ReferenceWebSearch {
    fn name(&self) -> &'static str {
        "reference-web"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let results = (1..=max_results.min(MAX_WEB_RESULTS))
            .map(|i| SearchResult {
                id: format!("search_result_{}", i),
                title: format!("Search Result {} for: {}", i, query),
                url: format!("https://example.com/result_{}", i),
                snippet: format!(
                    "This is a search result snippet for query '{}'. It contains relevant information about the topic.",
                    query
                ),
                relevance_score: Some((9 - i) as f64 / 10.0),
            })
            .collect();

        Ok(results)
    }
}
