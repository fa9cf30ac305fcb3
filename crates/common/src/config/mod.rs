//! Configuration management for DeepResearch services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values
//!
//! The loaded [`AppConfig`] is built once at startup and handed to the
//! orchestrator and its collaborators; nothing reads settings globally.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API key value shipped in sample `.env` files; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Text-generation service configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Search and fetch source configuration
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key for the text-generation service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_chat_model")]
    pub clarification_model: String,

    #[serde(default = "default_chat_model")]
    pub prompt_rewriting_model: String,

    #[serde(default = "default_o3_model")]
    pub deep_research_model_o3: String,

    #[serde(default = "default_o4_mini_model")]
    pub deep_research_model_o4_mini: String,

    /// Model used to synthesise gateway-driven research
    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,

    /// Timeout for clarify, rewrite and synthesis calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for tool-augmented deep research calls in seconds
    #[serde(default = "default_deep_research_timeout")]
    pub deep_research_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Internal source server host
    #[serde(default = "default_internal_host")]
    pub internal_host: String,

    /// Internal source server port
    #[serde(default = "default_internal_port")]
    pub internal_port: u16,

    /// Timeout for a single search or fetch call in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,

    /// Simulated latency of the reference web backend
    #[serde(default = "default_web_latency")]
    pub web_latency_ms: u64,

    /// Simulated latency of the reference internal search backend
    #[serde(default = "default_internal_search_latency")]
    pub internal_search_latency_ms: u64,

    /// Simulated latency of the reference internal fetch backend
    #[serde(default = "default_internal_fetch_latency")]
    pub internal_fetch_latency_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name attached to startup logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second (global)
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_api_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_chat_model() -> String { "gpt-4.1".to_string() }
fn default_o3_model() -> String { "o3-deep-research".to_string() }
fn default_o4_mini_model() -> String { "o4-mini-deep-research".to_string() }
fn default_synthesis_model() -> String { "gpt-4".to_string() }
fn default_request_timeout() -> u64 { 60 }
fn default_deep_research_timeout() -> u64 { 1200 }
fn default_internal_host() -> String { "localhost".to_string() }
fn default_internal_port() -> u16 { 8001 }
fn default_source_timeout() -> u64 { 30 }
fn default_web_latency() -> u64 { 500 }
fn default_internal_search_latency() -> u64 { 300 }
fn default_internal_fetch_latency() -> u64 { 200 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "deepresearch".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl LlmConfig {
    /// True when a usable API key is present
    pub fn is_configured(&self) -> bool {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) => !key.is_empty() && key != PLACEHOLDER_API_KEY,
            None => false,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deep_research_timeout(&self) -> Duration {
        Duration::from_secs(self.deep_research_timeout_secs)
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Zero simulated latency, for tests and local smoke runs
    pub fn without_latency(mut self) -> Self {
        self.web_latency_ms = 0;
        self.internal_search_latency_ms = 0;
        self.internal_fetch_latency_ms = 0;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            clarification_model: default_chat_model(),
            prompt_rewriting_model: default_chat_model(),
            deep_research_model_o3: default_o3_model(),
            deep_research_model_o4_mini: default_o4_mini_model(),
            synthesis_model: default_synthesis_model(),
            request_timeout_secs: default_request_timeout(),
            deep_research_timeout_secs: default_deep_research_timeout(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            internal_host: default_internal_host(),
            internal_port: default_internal_port(),
            timeout_secs: default_source_timeout(),
            web_latency_ms: default_web_latency(),
            internal_search_latency_ms: default_internal_search_latency(),
            internal_fetch_latency_ms: default_internal_fetch_latency(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}
