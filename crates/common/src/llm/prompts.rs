//! Prompt templates for the text generator

use crate::models::ClarificationWithAnswers;

/// System prompt for research analysis
pub const RESEARCH_SYSTEM_PROMPT: &str = "You are an expert research analyst. Your task is to conduct thorough research on the given topic using the available tools.

Research Process:
1. Use the search tool to find relevant information sources
2. Use the fetch tool to retrieve detailed content from the most promising sources
3. Analyze and synthesize the information to provide comprehensive insights
4. Cite your sources and provide evidence for your conclusions

Guidelines:
- Prioritize authoritative and recent sources
- Look for multiple perspectives on controversial topics
- Provide specific examples and data when available
- Structure your response clearly with headings and bullet points
- Include proper citations and source references";

pub fn build_clarification_prompt(query: &str) -> String {
    format!(
        r#"You are an expert research assistant. A user has submitted the following research query:

"{query}"

Your task is to:
1. Identify any ambiguities or missing context in the query
2. Generate 2-3 clarifying questions that would help improve the research
3. Provide a clarified intent statement based on reasonable assumptions

Focus on understanding:
- The specific scope and depth of research needed
- Target audience or use case
- Time frame or geographical constraints
- Preferred types of sources or evidence

Respond in JSON format with:
{{
    "questions": [
        {{"question": "...", "context": "..."}}
    ],
    "clarified_intent": "A clear statement of what the user likely wants to research"
}}"#
    )
}

pub fn build_rewrite_prompt(original_query: &str, clarification: &ClarificationWithAnswers) -> String {
    let answered: String = clarification
        .answered()
        .map(|(question, answer)| format!("Q: {}\nA: {}\n\n", question.question, answer))
        .collect();
    let answers = if answered.is_empty() {
        answered
    } else {
        format!("\nUser provided the following answers to clarification questions:\n{}", answered)
    };

    format!(
        r#"You are an expert prompt engineer for research tasks. You need to rewrite a user query into a comprehensive, detailed prompt suitable for deep research.

Original query: "{original_query}"
Clarified intent: "{intent}"
{answers}
Create a detailed, expanded prompt that:
1. Clearly defines the research scope and objectives based on user answers
2. Specifies the type of analysis needed incorporating user preferences
3. Includes guidance on source types and evidence quality as specified by user
4. Provides structure for the expected output matching user requirements
5. Incorporates best practices for comprehensive research

The rewritten prompt should be suitable for a deep research model that will:
- Search for relevant information using web search tools
- Fetch detailed content from promising sources
- Synthesize findings into a comprehensive analysis

Respond in JSON format:
{{
    "original_query": "{original_query}",
    "rewritten_prompt": "The comprehensive, detailed research prompt incorporating user answers",
    "reasoning": "Explanation of how user answers improved the research prompt"
}}"#,
        intent = clarification.clarified_intent,
    )
}
