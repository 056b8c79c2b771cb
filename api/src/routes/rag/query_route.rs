//! POST /rag/query: answers a question from a course's indexed content.

use std::sync::Arc;

use axum::{Json, extract::State};
use contextor::RagResult;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::rag::rag_request::QueryRequest,
};

/// Handler: POST /rag/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/rag/query \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is a lifetime?","course_id":"rust-101","top_k":5}'
/// ```
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<ApiResponse<RagResult>>> {
    let (question, course_id, opts) = body.into_parts();
    debug!(%course_id, "rag query: start");

    let result = state.pipeline.query(&question, &course_id, opts).await?;

    debug!(
        %course_id,
        sources = result.sources.len(),
        confidence = result.confidence,
        "rag query: done"
    );
    Ok(Json(ApiResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestStore, passage, state_with};
    use contextor::NO_CONTEXT_ANSWER;
    use pretty_assertions::assert_eq;

    fn body(question: &str) -> QueryRequest {
        serde_json::from_value(serde_json::json!({
            "question": question,
            "course_id": "rust-101"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn answers_with_sources_and_confidence() {
        let store = TestStore::with_passages(vec![
            passage("p1", "Ownership moves values.", 0.9),
            passage("p2", "Borrows are references.", 0.8),
        ]);
        let state = state_with(store, "Values are moved on assignment.");

        let Json(res) = query(State(state), Json(body("What is a move?")))
            .await
            .unwrap();
        let data = res.data.unwrap();
        assert_eq!(data.answer, "Values are moved on assignment.");
        assert_eq!(data.sources.len(), 2);
        assert_eq!(data.confidence, 0.85);
        assert_eq!(data.tokens_used, 42);
    }

    #[tokio::test]
    async fn no_matches_returns_fallback_answer() {
        let state = state_with(TestStore::default(), "unused");
        let Json(res) = query(State(state), Json(body("Anything?"))).await.unwrap();
        let data = res.data.unwrap();
        assert_eq!(data.answer, NO_CONTEXT_ANSWER);
        assert!(data.sources.is_empty());
        assert_eq!(data.confidence, 0.0);
    }

    #[tokio::test]
    async fn blank_question_is_invalid_input() {
        let state = state_with(TestStore::default(), "unused");
        let err = query(State(state), Json(body("   "))).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
