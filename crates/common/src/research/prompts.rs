//! Analysis prompts for the gateway-driven modes

use crate::models::{FetchResult, SearchResult};

/// Characters of each fetched document embedded in an analysis prompt
pub const FETCH_PREVIEW_CHARS: usize = 500;

/// Numbered list of search hits with URL and snippet
pub fn format_search_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "{}. {}\n   URL: {}\n   Snippet: {}",
                i + 1,
                result.title,
                result.url,
                result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbered list of fetched documents, each cut to its first 500 characters
pub fn format_fetch_results(results: &[FetchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let preview: String = result.content.chars().take(FETCH_PREVIEW_CHARS).collect();
            format!("Document {} (ID: {}):\n{}...", i + 1, result.id, preview)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn combined_prompt(query: &str, search: &[SearchResult], fetched: &[FetchResult]) -> String {
    format!(
        "Based on the research conducted on: {}\n\n\
         Search Results Found:\n{}\n\n\
         Detailed Content Retrieved:\n{}\n\n\
         Provide a comprehensive analysis that synthesizes the findings from both web search and internal sources.",
        query,
        format_search_results(search),
        format_fetch_results(fetched)
    )
}

pub fn web_only_prompt(query: &str, search: &[SearchResult]) -> String {
    format!(
        "Based on web search results for: {}\n\n\
         Search Results:\n{}\n\n\
         Provide a comprehensive analysis based on the web search findings.",
        query,
        format_search_results(search)
    )
}

pub fn internal_only_prompt(query: &str, search: &[SearchResult], fetched: &[FetchResult]) -> String {
    format!(
        "Based on internal research for: {}\n\n\
         Internal Sources Found:\n{}\n\n\
         Detailed Internal Content:\n{}\n\n\
         Provide a comprehensive analysis based on the internal sources and data.",
        query,
        format_search_results(search),
        format_fetch_results(fetched)
    )
}
