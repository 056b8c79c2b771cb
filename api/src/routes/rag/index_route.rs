//! POST /rag/index and /rag/index/batch: embed and persist course content.

use std::sync::Arc;

use axum::{Json, extract::State};
use contextor::IndexRequest;
use tracing::{debug, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::rag::rag_request::{IndexBatchRequest, IndexBatchResponse, IndexResponse},
};

/// Handler: POST /rag/index
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/rag/index \
///   -H 'content-type: application/json' \
///   -d '{"course_id":"rust-101","chapter_id":"ch-3","content_type":"lesson","text":"A trait defines shared behavior."}'
/// ```
pub async fn index_chunk(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IndexRequest>,
) -> AppResult<Json<ApiResponse<IndexResponse>>> {
    let id = state.pipeline.index(body).await?;
    Ok(Json(ApiResponse::success(IndexResponse { id })))
}

/// Handler: POST /rag/index/batch
pub async fn index_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IndexBatchRequest>,
) -> AppResult<Json<ApiResponse<IndexBatchResponse>>> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest("items must not be empty".into()));
    }
    let total = body.items.len();
    let ids = state
        .pipeline
        .index_many(body.items, |pct| debug!(progress = pct, "batch indexing"))
        .await?;
    info!(total, "batch indexed");
    Ok(Json(ApiResponse::success(IndexBatchResponse { ids })))
}
