//! Canned values returned when the text generator is unavailable

use crate::models::{ClarificationQuestion, ClarificationResponse, PromptRewriteResponse};

pub const FALLBACK_REWRITE_REASONING: &str = "Fallback prompt rewrite due to processing error";

const FALLBACK_INTENT: &str = "Conduct comprehensive research on the submitted topic, covering its current state, \
recent developments, key stakeholders and likely future implications.";

const FALLBACK_QUESTIONS: [(&str, &str); 3] = [
    (
        "What specific aspect of this topic should the research focus on?",
        "For example a particular sector, population, technology or use case, or a broad overview.",
    ),
    (
        "What time period should the analysis cover?",
        "Current trends (last 2-3 years), future projections (next 5-10 years), or a historical comparison.",
    ),
    (
        "Which kinds of evidence matter most to you?",
        "For example academic studies, industry reports, official statistics, or news coverage.",
    ),
];

/// Fixed clarification with generic questions
pub fn fallback_clarification() -> ClarificationResponse {
    ClarificationResponse {
        questions: FALLBACK_QUESTIONS
            .iter()
            .map(|(question, context)| ClarificationQuestion {
                question: question.to_string(),
                context: context.to_string(),
            })
            .collect(),
        clarified_intent: FALLBACK_INTENT.to_string(),
    }
}

/// Templated rewrite derived from the original query
pub fn fallback_rewrite(original_query: &str) -> PromptRewriteResponse {
    PromptRewriteResponse {
        original_query: original_query.to_string(),
        rewritten_prompt: format!(
            "Conduct comprehensive research on: {}. Provide detailed analysis with supporting evidence from multiple reliable sources.",
            original_query
        ),
        reasoning: FALLBACK_REWRITE_REASONING.to_string(),
    }
}

/// Error description used verbatim as the analysis text
pub fn fallback_analysis(reason: &str) -> String {
    format!("Error during deep research: {}", reason)
}
