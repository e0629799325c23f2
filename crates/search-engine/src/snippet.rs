//! Snippet and matched-line extraction for results.
//!
//! Windows are measured in characters, never bytes, so multi-byte text is
//! never split inside a code point.

use search_bm25::tokenize;
use search_types::LineRange;

/// Bounded excerpt of `content` centred on the first query term found.
///
/// Whitespace runs collapse to single spaces. Content that already fits is
/// returned whole; when no term occurs the excerpt is the leading window.
pub fn build_snippet(content: &str, query: &str, length: usize) -> String {
    let compact = content.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = compact.chars().collect();
    if chars.len() <= length {
        return compact;
    }

    let lower: Vec<char> = chars.iter().map(char::to_ascii_lowercase).collect();
    for term in tokenize(query) {
        if let Some(idx) = find_chars(&lower, &term) {
            let start = idx.saturating_sub(length / 2);
            let end = (start + length).min(chars.len());
            return window(&chars, start, end);
        }
    }

    window(&chars, 0, length)
}

/// 1-indexed first and last lines containing any query term.
pub fn build_line_range(content: &str, query: &str) -> Option<LineRange> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return None;
    }

    let mut range: Option<LineRange> = None;
    for (idx, line) in content.split('\n').enumerate() {
        let line = line.to_lowercase();
        if terms.iter().any(|term| line.contains(term.as_str())) {
            let line_no = idx + 1;
            range = Some(match range {
                Some(r) => LineRange {
                    start: r.start,
                    end: line_no,
                },
                None => LineRange {
                    start: line_no,
                    end: line_no,
                },
            });
        }
    }
    range
}

fn window(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect::<String>().trim().to_string()
}

fn find_chars(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
}
