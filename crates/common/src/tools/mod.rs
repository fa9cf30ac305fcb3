//! Tool definitions exposed to model-driven research
//!
//! A [`ToolDefinition`] is the self-describing contract a deep research model
//! reads to learn which capabilities it may invoke. The JSON shape is the
//! function-calling format:
//!
//! ```json
//! {"type": "function", "function": {"name": "...", "description": "...",
//!   "parameters": {"type": "object", "properties": {...}, "required": [...]}}}
//! ```
//!
//! The same definitions drive [`ToolExecutor`], which runs a tool call by
//! name against the configured sources.

mod executor;

pub use executor::{ToolCall, ToolExecutor};

use crate::models::ResearchMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const WEB_SEARCH_TOOL: &str = "web_search";
pub const INTERNAL_SEARCH_TOOL: &str = "mcp_search";
pub const INTERNAL_FETCH_TOOL: &str = "mcp_fetch";

/// Default `max_results` advertised by the search tools
pub const DEFAULT_TOOL_MAX_RESULTS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BTreeMap<String, ParameterProperty>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterProperty {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ToolDefinition {
    /// Function tool with no parameters yet
    pub fn function(name: &str, description: &str) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.to_string(),
                description: description.to_string(),
                parameters: ParameterSchema {
                    kind: "object".to_string(),
                    properties: BTreeMap::new(),
                    required: Vec::new(),
                },
            },
        }
    }

    /// Add a required parameter
    pub fn required(mut self, name: &str, kind: &str, description: &str) -> Self {
        self.function.parameters.properties.insert(
            name.to_string(),
            ParameterProperty {
                kind: kind.to_string(),
                description: description.to_string(),
                default: None,
            },
        );
        self.function.parameters.required.push(name.to_string());
        self
    }

    /// Add an optional parameter with a default value
    pub fn optional(mut self, name: &str, kind: &str, description: &str, default: Value) -> Self {
        self.function.parameters.properties.insert(
            name.to_string(),
            ParameterProperty {
                kind: kind.to_string(),
                description: description.to_string(),
                default: Some(default),
            },
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Source of the three research tools. Pure and deterministic.
pub struct ToolCatalog;

impl ToolCatalog {
    pub fn web_search_tool() -> ToolDefinition {
        ToolDefinition::function(WEB_SEARCH_TOOL, "Search the web for information on a given query")
            .required("query", "string", "The search query to execute")
            .optional(
                "max_results",
                "integer",
                "Maximum number of search results to return",
                Value::from(DEFAULT_TOOL_MAX_RESULTS),
            )
    }

    pub fn internal_search_tool() -> ToolDefinition {
        ToolDefinition::function(INTERNAL_SEARCH_TOOL, "Search internal documents and data sources")
            .required("query", "string", "The search query to execute against internal sources")
            .optional(
                "max_results",
                "integer",
                "Maximum number of search results to return",
                Value::from(DEFAULT_TOOL_MAX_RESULTS),
            )
    }

    pub fn internal_fetch_tool() -> ToolDefinition {
        ToolDefinition::function(INTERNAL_FETCH_TOOL, "Fetch detailed content from internal sources")
            .required("id", "string", "The ID of the document or resource to fetch")
    }

    /// Web search, internal search, internal fetch, in that order
    pub fn all() -> Vec<ToolDefinition> {
        vec![
            Self::web_search_tool(),
            Self::internal_search_tool(),
            Self::internal_fetch_tool(),
        ]
    }

    /// Tools handed to the analysis call for `mode`
    pub fn for_mode(mode: ResearchMode) -> Vec<ToolDefinition> {
        if mode.is_model_driven() {
            Self::all()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_calls_are_pure() {
        assert_eq!(ToolCatalog::all(), ToolCatalog::all());
        assert_eq!(
            serde_json::to_value(ToolCatalog::web_search_tool()).unwrap(),
            serde_json::to_value(ToolCatalog::web_search_tool()).unwrap()
        );
    }

    #[test]
    fn test_web_search_wire_shape() {
        let value = serde_json::to_value(ToolCatalog::web_search_tool()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "function",
                "function": {
                    "name": "web_search",
                    "description": "Search the web for information on a given query",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query to execute"
                            },
                            "max_results": {
                                "type": "integer",
                                "description": "Maximum number of search results to return",
                                "default": 10
                            }
                        },
                        "required": ["query"]
                    }
                }
            })
        );
    }

    #[test]
    fn test_fetch_tool_requires_id() {
        let tool = ToolCatalog::internal_fetch_tool();
        assert_eq!(tool.name(), INTERNAL_FETCH_TOOL);
        assert_eq!(tool.function.parameters.required, vec!["id".to_string()]);
        assert!(tool.function.parameters.properties["id"].default.is_none());
    }

    #[test]
    fn test_tools_per_mode() {
        let names: Vec<_> = ToolCatalog::for_mode(ResearchMode::O3)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec![WEB_SEARCH_TOOL, INTERNAL_SEARCH_TOOL, INTERNAL_FETCH_TOOL]);

        assert_eq!(ToolCatalog::for_mode(ResearchMode::O4Mini).len(), 3);
        for mode in [ResearchMode::WebMcp, ResearchMode::WebOnly, ResearchMode::McpOnly] {
            assert!(ToolCatalog::for_mode(mode).is_empty());
        }
    }
}
