use contextor::{IndexRequest, QueryOptions};
use rag_store::{RagFilter, RetrievedPassage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request payload for /rag/query and /rag/search.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub course_id: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub max_context_tokens: Option<usize>,
    /// Chat model override; ignored by /rag/search.
    #[serde(default)]
    pub model: Option<String>,
    /// Exact-match metadata filters, e.g. `{"lesson_kind": "video"}`.
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
}

impl QueryRequest {
    /// Splits the body into the routing keys and per-query options.
    pub fn into_parts(self) -> (String, String, QueryOptions) {
        let opts = QueryOptions {
            top_k: self.top_k,
            similarity_threshold: self.similarity_threshold,
            max_context_tokens: self.max_context_tokens,
            model: self.model,
            filter: self.filters.map(RagFilter::from),
        };
        (self.question, self.course_id, opts)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub passages: Vec<RetrievedPassage>,
}

/// Request payload for /rag/index/batch.
#[derive(Debug, Deserialize)]
pub struct IndexBatchRequest {
    pub items: Vec<IndexRequest>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct IndexBatchResponse {
    pub ids: Vec<String>,
}
