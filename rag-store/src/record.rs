//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chunk to be embedded-and-stored; the store assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewChunk {
    pub course_id: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
    /// Free-form tag such as `lesson`, `transcript`, `quiz`.
    pub content_type: String,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A ranked passage returned by a similarity match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub id: String,
    pub content: String,
    /// 0..=1, higher is closer.
    pub similarity: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Parameters of one similarity match, scoped to a course.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchQuery {
    pub embedding: Vec<f32>,
    pub course_id: String,
    pub top_k: usize,
    pub threshold: f64,
    pub filter: Option<RagFilter>,
}

/// Exact-equality filter on metadata fields, e.g. `{"lesson_kind": "video"}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RagFilter {
    pub equals: Vec<(String, Value)>,
}

impl RagFilter {
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }

    /// The filter as a JSON object; later duplicates of a field win.
    pub fn to_json_object(&self) -> Map<String, Value> {
        self.equals.iter().cloned().collect()
    }
}

impl From<Map<String, Value>> for RagFilter {
    fn from(m: Map<String, Value>) -> Self {
        Self {
            equals: m.into_iter().collect(),
        }
    }
}
