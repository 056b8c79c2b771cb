//! Token-bounded context assembly.

use rag_embed::estimate_tokens;
use rag_store::RetrievedPassage;

/// Separator placed between passages.
pub const PASSAGE_DELIMITER: &str = "\n\n---\n\n";

/// Joins passages, in the order given, while their estimated token total
/// stays within `max_tokens`.
///
/// Stops at the first passage that would overflow; a passage is never cut.
/// Delimiters are not counted.
pub fn build_context(passages: &[RetrievedPassage], max_tokens: usize) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut used = 0usize;

    for p in passages {
        let cost = estimate_tokens(&p.content);
        if used + cost > max_tokens {
            break;
        }
        used += cost;
        parts.push(&p.content);
    }

    parts.join(PASSAGE_DELIMITER)
}
