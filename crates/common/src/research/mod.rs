//! Research pipeline
//!
//! A run sequences optional clarification, optional prompt rewriting, and one
//! mode [`Strategy`], recording every stage in a [`StepTracer`]. The
//! [`ResearchOrchestrator`] turns any failure into a failed
//! [`ResearchResult`](crate::models::ResearchResult) instead of an error.

mod orchestrator;
pub mod prompts;
mod strategy;
mod tracer;

pub use orchestrator::{ResearchOrchestrator, Timeouts};
pub use strategy::{
    RunState, Strategy, StrategyContext, COMBINED_FETCH_WINDOW, COMBINED_INTERNAL_RESULTS,
    COMBINED_WEB_RESULTS, INTERNAL_ONLY_RESULTS, WEB_ONLY_RESULTS,
};
pub use tracer::StepTracer;
