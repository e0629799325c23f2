//! Plain-text renderings of indexing summaries and search results.

use search_types::{IndexSummary, SearchResult};

/// Character cap for one result's snippet or content.
pub const MAX_RESULT_CHARS: usize = 2_000;

/// Character cap for a whole report.
pub const MAX_OUTPUT_CHARS: usize = 80_000;

/// Appended after a truncated text.
pub const TRUNCATION_NOTICE: &str =
    "... [results truncated, try being more specific with your parameters]";

/// Cut `text` to `limit` characters, appending the truncation notice when cut.
pub fn truncate_if_too_long(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}\n{}", &text[..byte_idx], TRUNCATION_NOTICE),
        None => text.to_string(),
    }
}

/// Render an indexing summary.
pub fn format_index_summary(summary: &IndexSummary) -> String {
    let mut lines = vec![
        format!("Indexed {} file(s).", summary.indexed),
        format!("Skipped {} file(s).", summary.skipped),
    ];
    if let Some(count) = summary.vector_indexed {
        lines.push(format!("Vector indexed {count} file(s)."));
    }
    if summary.has_errors() {
        lines.push("Errors:".to_string());
        lines.extend(summary.errors.iter().map(|e| format!("- {e}")));
    }
    lines.join("\n")
}

/// Render ranked results, one numbered entry each.
pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut lines = vec![format!("Found {} result(s):", results.len())];
    for (idx, result) in results.iter().enumerate() {
        let mut scores = vec![format!("score={:.3}", result.score)];
        if let Some(details) = &result.score_details {
            if let Some(bm25) = details.bm25 {
                scores.push(format!("bm25={bm25:.3}"));
            }
            if let Some(vector) = details.vector {
                scores.push(format!("vector={vector:.3}"));
            }
        }
        lines.push(format!("{}. {} ({})", idx + 1, result.path, scores.join(", ")));

        if let Some(range) = result.line_range {
            lines.push(format!("   lines {}-{}", range.start, range.end));
        }

        let body = result
            .snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&result.content);
        if !body.is_empty() {
            lines.push(format!("   {}", truncate_if_too_long(body, MAX_RESULT_CHARS)));
        }
    }

    truncate_if_too_long(&lines.join("\n"), MAX_OUTPUT_CHARS)
}
