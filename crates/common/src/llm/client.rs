//! OpenAI-compatible text service over HTTP
//!
//! - Clarification and rewriting use chat completions in JSON mode
//! - Model-driven research uses the Responses API with the web search tool
//! - Synthesis for the gateway-driven modes uses plain chat completions
//!
//! Without a configured API key the service runs offline and every call
//! returns its fallback.

use super::fallback::{fallback_analysis, fallback_clarification, fallback_rewrite};
use super::prompts::{build_clarification_prompt, build_rewrite_prompt, RESEARCH_SYSTEM_PROMPT};
use super::{AnalysisOptions, Outcome, TextService};
use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{
    ClarificationResponse, ClarificationWithAnswers, PromptRewriteResponse, ResearchMode,
};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use regex_lite::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

const OFFLINE_REASON: &str = "text service API key is not configured";

/// Text service backed by an OpenAI-compatible API
pub struct OpenAiTextService {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiTextService {
    /// Create the service with one pooled HTTP client
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.deep_research_timeout())
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        if !config.is_configured() {
            tracing::warn!("No text service API key configured, running with fallbacks only");
        }

        Ok(Self { config, client })
    }

    pub fn is_offline(&self) -> bool {
        !self.config.is_configured()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn model_for(&self, mode: ResearchMode) -> &str {
        match mode {
            ResearchMode::O3 => &self.config.deep_research_model_o3,
            ResearchMode::O4Mini => &self.config.deep_research_model_o4_mini,
            _ => &self.config.synthesis_model,
        }
    }

    async fn post(&self, path: &str, body: &Value, timeout: std::time::Duration) -> Result<Value> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TextService {
                message: format!("API error {}: {}", status, body),
            });
        }

        Ok(response.json().await?)
    }

    /// Chat completion in JSON mode, decoded into `T`
    async fn chat_json<T: DeserializeOwned>(&self, model: &str, prompt: &str) -> Result<T> {
        let body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
        });

        let response = self.post("chat/completions", &body, self.config.request_timeout()).await?;
        parse_json_content(&chat_content(&response)?)
    }

    async fn synthesize(&self, model: &str, prompt: &str, tools: &[ToolDefinition], options: &AnalysisOptions) -> Result<String> {
        let mut body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": RESEARCH_SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
        }

        let response = self.post("chat/completions", &body, self.config.request_timeout()).await?;
        chat_content(&response)
    }

    async fn deep_research(&self, model: &str, prompt: &str, options: &AnalysisOptions) -> Result<String> {
        let body = responses_payload(model, prompt, options);
        let response = self.post("responses", &body, self.config.deep_research_timeout()).await?;
        extract_response_text(&response)
    }
}

#[async_trait]
impl TextService for OpenAiTextService {
    async fn clarify(&self, query: &str) -> Outcome<ClarificationResponse> {
        if self.is_offline() {
            return fall_back("clarify", fallback_clarification(), OFFLINE_REASON.to_string());
        }

        let prompt = build_clarification_prompt(query);
        match self.chat_json(&self.config.clarification_model, &prompt).await {
            Ok(response) => Outcome::Ok(response),
            Err(e) => fall_back("clarify", fallback_clarification(), e.to_string()),
        }
    }

    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> Outcome<PromptRewriteResponse> {
        if self.is_offline() {
            return fall_back("rewrite", fallback_rewrite(original_query), OFFLINE_REASON.to_string());
        }

        #[derive(Deserialize)]
        struct RewritePayload {
            original_query: Option<String>,
            rewritten_prompt: String,
            #[serde(default)]
            reasoning: String,
        }

        let prompt = build_rewrite_prompt(original_query, clarification);
        match self
            .chat_json::<RewritePayload>(&self.config.prompt_rewriting_model, &prompt)
            .await
        {
            Ok(payload) => Outcome::Ok(PromptRewriteResponse {
                original_query: payload
                    .original_query
                    .unwrap_or_else(|| original_query.to_string()),
                rewritten_prompt: payload.rewritten_prompt,
                reasoning: payload.reasoning,
            }),
            Err(e) => fall_back("rewrite", fallback_rewrite(original_query), e.to_string()),
        }
    }

    async fn analyze(
        &self,
        prompt: &str,
        mode: ResearchMode,
        tools: &[ToolDefinition],
        options: &AnalysisOptions,
    ) -> Outcome<String> {
        if self.is_offline() {
            return fall_back("analyze", fallback_analysis(OFFLINE_REASON), OFFLINE_REASON.to_string());
        }

        let model = self.model_for(mode);
        tracing::info!(model, mode = %mode, tools = tools.len(), "Starting analysis");

        let result = if mode.is_model_driven() {
            self.deep_research(model, prompt, options).await
        } else {
            self.synthesize(model, prompt, tools, options).await
        };

        match result {
            Ok(analysis) => Outcome::Ok(analysis),
            Err(e) => {
                let reason = e.to_string();
                fall_back("analyze", fallback_analysis(&reason), reason)
            }
        }
    }
}

fn fall_back<T>(operation: &'static str, value: T, reason: String) -> Outcome<T> {
    tracing::warn!(operation, reason = %reason, "Text service fell back to canned value");
    metrics::record_fallback(operation);
    Outcome::Fallback { value, reason }
}

/// Request body for the Responses API
fn responses_payload(model: &str, prompt: &str, options: &AnalysisOptions) -> Value {
    json!({
        "model": model,
        "input": [{
            "role": "user",
            "content": [{
                "type": "input_text",
                "text": format!("{}\n\nUser Query: {}", RESEARCH_SYSTEM_PROMPT, prompt),
            }],
        }],
        "reasoning": { "summary": "auto" },
        "tools": [{ "type": "web_search_preview" }],
        "max_tool_calls": options.max_tool_calls,
    })
}

/// First choice's message content of a chat completion
fn chat_content(response: &Value) -> Result<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::TextService {
            message: "No content returned".to_string(),
        })
}

/// Text of a Responses API reply: `output_text` when present, otherwise the
/// concatenated text parts of the output messages
fn extract_response_text(response: &Value) -> Result<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        return Ok(text.to_string());
    }

    let parts: Vec<&str> = response
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        return Err(AppError::TextService {
            message: "No response generated".to_string(),
        });
    }
    Ok(parts.join("\n"))
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Decode model output as JSON, tolerating prose or code fences around the object
fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(err) => match json_object_pattern().find(content) {
            Some(found) => Ok(serde_json::from_str(found.as_str())?),
            None => Err(err.into()),
        },
    }
}
