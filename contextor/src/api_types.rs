//! Public API types re-used by external crates (e.g., the HTTP API layer).

use rag_store::{RagFilter, RetrievedPassage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-call overrides; `None` falls back to [`crate::QueryDefaults`].
///
/// # Example
/// ```
/// use contextor::QueryOptions;
/// let opts = QueryOptions { top_k: Some(3), ..Default::default() };
/// assert_eq!(opts.similarity_threshold, None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub top_k: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub max_context_tokens: Option<usize>,
    /// Chat model override for this query.
    pub model: Option<String>,
    pub filter: Option<RagFilter>,
}

/// Answer with the passages it was grounded on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RagResult {
    pub answer: String,
    pub sources: Vec<RetrievedPassage>,
    /// 0..=1, two decimals.
    pub confidence: f64,
    pub tokens_used: u32,
}

/// One piece of course content to index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub course_id: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
    pub content_type: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}
