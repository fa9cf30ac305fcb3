//! Data model shared by the orchestrator and the HTTP surface
//!
//! Every value here is created and owned by a single research run; nothing
//! is persisted or shared between runs.

mod prompting;
mod research;
mod source;

pub use prompting::{
    ClarificationAnswer, ClarificationQuestion, ClarificationResponse,
    ClarificationWithAnswers, ClarifyRequest, PromptRewriteResponse, RewritePromptRequest,
};
pub use research::{
    ResearchAnalysisRequest, ResearchDepth, ResearchMode, ResearchRequest, ResearchResult,
    ResearchStep, StepType,
};
pub use source::{
    FetchResult, SearchResult, SourceFetchRequest, SourceSearchRequest, WebSearchRequest,
    INTERNAL_URL_SCHEME,
};
