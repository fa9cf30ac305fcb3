//! In-memory collaborators for unit tests

use crate::errors::{AppError, Result};
use crate::llm::{fallback_clarification, AnalysisOptions, Outcome, TextService};
use crate::models::{
    ClarificationQuestion, ClarificationResponse, ClarificationWithAnswers, FetchResult,
    PromptRewriteResponse, ResearchMode, SearchResult, INTERNAL_URL_SCHEME,
};
use crate::sources::{FetchGateway, SearchGateway};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Search backend returning `count` numbered results
pub struct StubSearch {
    prefix: &'static str,
    count: usize,
    internal: bool,
    honor_max_results: bool,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl StubSearch {
    /// Web results `web_1..=count`
    pub fn web(count: usize) -> Self {
        Self {
            prefix: "web",
            count,
            internal: false,
            honor_max_results: true,
            delay: None,
            failure: None,
        }
    }

    /// Internal results `doc_1..=count` with internal URLs
    pub fn internal(count: usize) -> Self {
        Self {
            prefix: "doc",
            internal: true,
            ..Self::web(count)
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::web(0)
        }
    }

    pub fn ignoring_max_results(mut self) -> Self {
        self.honor_max_results = false;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SearchGateway for StubSearch {
    fn name(&self) -> &'static str {
        "stub-search"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(AppError::source_failure("stub", message.clone()));
        }

        let count = if self.honor_max_results {
            self.count.min(max_results)
        } else {
            self.count
        };

        Ok((1..=count)
            .map(|i| {
                let id = format!("{}_{}", self.prefix, i);
                let url = if self.internal {
                    format!("{}internal/{}", INTERNAL_URL_SCHEME, id)
                } else {
                    format!("https://example.org/{}", id)
                };
                SearchResult {
                    title: format!("{} about {}", id, query),
                    snippet: format!("Snippet {}", i),
                    relevance_score: Some(1.0 / i as f64),
                    id,
                    url,
                }
            })
            .collect())
    }
}

/// Fetch backend that knows every id except the ones marked missing
#[derive(Default)]
pub struct StubFetch {
    missing: HashSet<String>,
    failure: Option<String>,
    content_len: Option<usize>,
    calls: Mutex<Vec<String>>,
}

impl StubFetch {
    pub fn missing(mut self, id: &str) -> Self {
        self.missing.insert(id.to_string());
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Pad every document body to exactly `len` characters
    pub fn with_content_len(mut self, len: usize) -> Self {
        self.content_len = Some(len);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchGateway for StubFetch {
    fn name(&self) -> &'static str {
        "stub-fetch"
    }

    async fn fetch(&self, id: &str) -> Result<FetchResult> {
        self.calls.lock().unwrap().push(id.to_string());

        if let Some(message) = &self.failure {
            return Err(AppError::source_failure("stub", message.clone()));
        }
        if self.missing.contains(id) {
            return Err(AppError::SourceNotFound { id: id.to_string() });
        }

        let content = match self.content_len {
            Some(len) => "x".repeat(len),
            None => format!("Content of {}", id),
        };
        Ok(FetchResult {
            id: id.to_string(),
            content,
            metadata: BTreeMap::new(),
        })
    }
}

/// Arguments of one recorded `analyze` call
#[derive(Debug, Clone)]
pub struct AnalyzeCall {
    pub prompt: String,
    pub mode: ResearchMode,
    pub tools: Vec<String>,
    pub options: AnalysisOptions,
}

/// Text service with scripted answers
pub struct StubText {
    clarify_fails: bool,
    analysis: String,
    analysis_delay: Option<Duration>,
    analyze_panics: bool,
    rewrites: Mutex<Vec<ClarificationWithAnswers>>,
    analyses: Mutex<Vec<AnalyzeCall>>,
}

impl Default for StubText {
    fn default() -> Self {
        Self {
            clarify_fails: false,
            analysis: "stub analysis".to_string(),
            analysis_delay: None,
            analyze_panics: false,
            rewrites: Mutex::new(Vec::new()),
            analyses: Mutex::new(Vec::new()),
        }
    }
}

impl StubText {
    pub fn with_analysis(mut self, analysis: &str) -> Self {
        self.analysis = analysis.to_string();
        self
    }

    pub fn failing_clarify(mut self) -> Self {
        self.clarify_fails = true;
        self
    }

    pub fn with_analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = Some(delay);
        self
    }

    pub fn panicking_analyze(mut self) -> Self {
        self.analyze_panics = true;
        self
    }

    pub fn rewrite_contexts(&self) -> Vec<ClarificationWithAnswers> {
        self.rewrites.lock().unwrap().clone()
    }

    pub fn analyze_calls(&self) -> Vec<AnalyzeCall> {
        self.analyses.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextService for StubText {
    async fn clarify(&self, query: &str) -> Outcome<ClarificationResponse> {
        if self.clarify_fails {
            return Outcome::fallback(fallback_clarification(), "stub clarify failure");
        }
        Outcome::Ok(ClarificationResponse {
            questions: vec![ClarificationQuestion {
                question: "Which region?".to_string(),
                context: "Scope".to_string(),
            }],
            clarified_intent: format!("Clarified: {}", query),
        })
    }

    async fn rewrite(
        &self,
        original_query: &str,
        clarification: &ClarificationWithAnswers,
    ) -> Outcome<PromptRewriteResponse> {
        self.rewrites.lock().unwrap().push(clarification.clone());
        Outcome::Ok(PromptRewriteResponse {
            original_query: original_query.to_string(),
            rewritten_prompt: format!("Rewritten: {}", original_query),
            reasoning: "stub".to_string(),
        })
    }

    async fn analyze(
        &self,
        prompt: &str,
        mode: ResearchMode,
        tools: &[ToolDefinition],
        options: &AnalysisOptions,
    ) -> Outcome<String> {
        self.analyses.lock().unwrap().push(AnalyzeCall {
            prompt: prompt.to_string(),
            mode,
            tools: tools.iter().map(|tool| tool.name().to_string()).collect(),
            options: *options,
        });

        if self.analyze_panics {
            panic!("stub analyze panic");
        }
        if let Some(delay) = self.analysis_delay {
            tokio::time::sleep(delay).await;
        }
        Outcome::Ok(self.analysis.clone())
    }
}
