//! DeepResearch Common Library
//!
//! Shared code for the DeepResearch service including:
//! - Request, result and trace models
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability
//! - Tool catalog and direct tool execution
//! - Search and fetch source gateways
//! - Text service (clarification, rewriting, analysis)
//! - Research orchestration

pub mod config;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod research;
pub mod sources;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use llm::{Outcome, TextService};
pub use research::ResearchOrchestrator;
pub use sources::{FetchGateway, SearchGateway, SourceSet};
pub use tools::{ToolCatalog, ToolExecutor};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
