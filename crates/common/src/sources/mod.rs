//! Search and fetch source abstraction
//!
//! The orchestrator only sees two capabilities:
//! - [`SearchGateway`]: ranked search over one kind of source (web or internal)
//! - [`FetchGateway`]: full content retrieval for an internal result id
//!
//! [`SourceSet`] bundles one web gateway, one internal gateway and one fetch
//! gateway, and applies the per-call timeout, metrics and logging that every
//! caller needs.

mod internal;
mod web;

pub use internal::{ReferenceInternalSource, INTERNAL_DOCUMENT_COUNT};
pub use web::ReferenceWebSearch;

use crate::config::SourcesConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{FetchResult, SearchResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which family of sources a search targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Web,
    Internal,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Web => "web",
            SourceKind::Internal => "internal",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for ranked search over a source
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Backend name for logs and metrics
    fn name(&self) -> &'static str;

    /// Search for `query`, returning at most `max_results` hits in rank order
    /// with ids unique within the call.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Trait for full-content retrieval from internal sources
#[async_trait]
pub trait FetchGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the document behind `id`; fails with [`AppError::SourceNotFound`]
    /// when the id is unknown.
    async fn fetch(&self, id: &str) -> Result<FetchResult>;
}

/// The gateways a research run can reach
#[derive(Clone)]
pub struct SourceSet {
    web: Arc<dyn SearchGateway>,
    internal: Arc<dyn SearchGateway>,
    fetcher: Arc<dyn FetchGateway>,
    timeout: Duration,
}

impl SourceSet {
    pub fn new(
        web: Arc<dyn SearchGateway>,
        internal: Arc<dyn SearchGateway>,
        fetcher: Arc<dyn FetchGateway>,
    ) -> Self {
        Self {
            web,
            internal,
            fetcher,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reference backends wired from configuration
    pub fn reference(config: &SourcesConfig) -> Self {
        Self::with_internal(Arc::new(ReferenceInternalSource::new(config)), config)
    }

    /// Reference backends, with the internal source initialized first
    pub async fn connect_reference(config: &SourcesConfig) -> Result<Self> {
        let internal = Arc::new(ReferenceInternalSource::new(config));
        internal.initialize().await?;
        Ok(Self::with_internal(internal, config))
    }

    fn with_internal(internal: Arc<ReferenceInternalSource>, config: &SourcesConfig) -> Self {
        Self::new(
            Arc::new(ReferenceWebSearch::new(Duration::from_millis(config.web_latency_ms))),
            internal.clone(),
            internal,
        )
        .with_timeout(config.timeout())
    }

    /// Search one kind of source, bounded by the source timeout
    pub async fn search(
        &self,
        kind: SourceKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let gateway = match kind {
            SourceKind::Web => &self.web,
            SourceKind::Internal => &self.internal,
        };
        let start = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, gateway.search(query, max_results)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AppError::Timeout {
                operation: format!("{} search", kind),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        metrics::record_gateway_call(kind.as_str(), "search", start.elapsed().as_secs_f64(), outcome.is_ok());

        let mut results = outcome.map_err(|e| {
            tracing::error!(source = %kind, backend = gateway.name(), error = %e, "Search failed");
            e
        })?;

        if results.len() > max_results {
            tracing::warn!(
                source = %kind,
                backend = gateway.name(),
                returned = results.len(),
                max_results,
                "Search backend exceeded max_results, truncating"
            );
            results.truncate(max_results);
        }

        tracing::debug!(source = %kind, results = results.len(), "Search completed");
        Ok(results)
    }

    /// Fetch one internal document, bounded by the source timeout
    pub async fn fetch(&self, id: &str) -> Result<FetchResult> {
        let start = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, self.fetcher.fetch(id)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AppError::Timeout {
                operation: format!("fetch of '{}'", id),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        metrics::record_gateway_call(SourceKind::Internal.as_str(), "fetch", start.elapsed().as_secs_f64(), outcome.is_ok());

        outcome.map_err(|e| {
            if e.is_not_found() {
                tracing::warn!(id, backend = self.fetcher.name(), "Fetch of unknown id");
            } else {
                tracing::error!(id, backend = self.fetcher.name(), error = %e, "Fetch failed");
            }
            e
        })
    }
}
