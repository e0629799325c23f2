//! Text tokenization.
//!
//! Lower-cases input and splits on runs of characters outside `[a-z0-9]`.
//! No stemming, no stop words.

use std::collections::HashMap;

/// Split text into lower-case ASCII alphanumeric tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count occurrences of each token.
pub fn term_frequencies(tokens: &[String]) -> HashMap<String, u32> {
    let mut freq = HashMap::new();
    for token in tokens {
        *freq.entry(token.clone()).or_insert(0) += 1;
    }
    freq
}
