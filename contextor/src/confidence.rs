//! Heuristic answer confidence.

use rag_store::RetrievedPassage;

/// Lower-cased phrases that mark an answer as hedged.
pub const HEDGING_PHRASES: &[&str] = &[
    "i don't know",
    "not sure",
    "cannot find",
    "no information",
    "unclear",
];

/// Mean passage similarity, halved for hedged answers, rounded to two decimals.
///
/// No passages means no confidence.
pub fn score_confidence(passages: &[RetrievedPassage], answer: &str) -> f64 {
    if passages.is_empty() {
        return 0.0;
    }
    let mut score =
        passages.iter().map(|p| p.similarity).sum::<f64>() / passages.len() as f64;

    let lower = answer.to_lowercase();
    if HEDGING_PHRASES.iter().any(|h| lower.contains(h)) {
        score *= 0.5;
    }

    (score * 100.0).round() / 100.0
}
