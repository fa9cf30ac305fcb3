//! Direct execution of catalog tools against the configured sources

use super::{DEFAULT_TOOL_MAX_RESULTS, INTERNAL_FETCH_TOOL, INTERNAL_SEARCH_TOOL, WEB_SEARCH_TOOL};
use crate::errors::{AppError, Result};
use crate::sources::{SourceKind, SourceSet};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Upper bound on `max_results` accepted from a tool call
const MAX_TOOL_RESULTS: usize = 50;

/// A tool invocation by name, as a model would emit it
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToolCall {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Runs catalog tools by name
#[derive(Clone)]
pub struct ToolExecutor {
    sources: SourceSet,
}

impl ToolExecutor {
    pub fn new(sources: SourceSet) -> Self {
        Self { sources }
    }

    /// Execute one tool call and return its JSON result: a list of search
    /// results for the search tools, a fetch result for the fetch tool.
    pub async fn execute(&self, call: &ToolCall) -> Result<Value> {
        tracing::debug!(tool = %call.name, "Executing tool call");

        match call.name.as_str() {
            WEB_SEARCH_TOOL => self.search(SourceKind::Web, &call.arguments).await,
            INTERNAL_SEARCH_TOOL => self.search(SourceKind::Internal, &call.arguments).await,
            INTERNAL_FETCH_TOOL => {
                let id = string_argument(&call.arguments, "id")?;
                let document = self.sources.fetch(id).await?;
                Ok(serde_json::to_value(document)?)
            }
            other => Err(AppError::Validation {
                message: format!("Unknown tool '{}'", other),
                field: Some("name".to_string()),
            }),
        }
    }

    async fn search(&self, kind: SourceKind, arguments: &Value) -> Result<Value> {
        let query = string_argument(arguments, "query")?;
        let max_results = match arguments.get("max_results") {
            None | Some(Value::Null) => DEFAULT_TOOL_MAX_RESULTS as usize,
            Some(value) => value
                .as_u64()
                .filter(|n| (1..=MAX_TOOL_RESULTS as u64).contains(n))
                .ok_or_else(|| AppError::Validation {
                    message: format!("max_results must be an integer between 1 and {}", MAX_TOOL_RESULTS),
                    field: Some("max_results".to_string()),
                })? as usize,
        };

        let results = self.sources.search(kind, query, max_results).await?;
        Ok(serde_json::to_value(results)?)
    }
}

fn string_argument<'a>(arguments: &'a Value, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation {
            message: format!("Missing required string argument '{}'", name),
            field: Some(name.to_string()),
        })
}
