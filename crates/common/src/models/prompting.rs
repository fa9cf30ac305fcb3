//! Clarification and prompt-rewriting types

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub question: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationResponse {
    pub questions: Vec<ClarificationQuestion>,
    pub clarified_intent: String,
}

/// A user's answer to one clarification question, addressed by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswer {
    pub question_index: i64,
    pub answer: String,
}

/// Clarification output paired with whatever answers the user gave
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClarificationWithAnswers {
    #[serde(default)]
    pub questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub answers: Vec<ClarificationAnswer>,
    #[serde(default)]
    pub clarified_intent: String,
}

impl ClarificationWithAnswers {
    /// Context used when rewriting runs without a clarification stage
    pub fn unclarified(query: &str) -> Self {
        Self {
            questions: Vec::new(),
            answers: Vec::new(),
            clarified_intent: query.to_string(),
        }
    }

    /// Answered questions in answer order. Answers whose index does not point
    /// into `questions` are skipped.
    pub fn answered(&self) -> impl Iterator<Item = (&ClarificationQuestion, &str)> + '_ {
        self.answers.iter().filter_map(|answer| {
            usize::try_from(answer.question_index)
                .ok()
                .and_then(|index| self.questions.get(index))
                .map(|question| (question, answer.answer.as_str()))
        })
    }
}

impl From<ClarificationResponse> for ClarificationWithAnswers {
    fn from(response: ClarificationResponse) -> Self {
        Self {
            questions: response.questions,
            answers: Vec::new(),
            clarified_intent: response.clarified_intent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRewriteResponse {
    pub original_query: String,
    pub rewritten_prompt: String,
    pub reasoning: String,
}

/// Body of `/clarify`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClarifyRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
}

/// Body of `/rewrite-prompt`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RewritePromptRequest {
    #[validate(length(min = 1, max = 4000))]
    pub original_query: String,
    #[serde(default)]
    pub clarification_with_answers: ClarificationWithAnswers,
}
