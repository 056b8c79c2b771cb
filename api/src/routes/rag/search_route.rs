//! POST /rag/search: ranked passages without answer synthesis.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::rag::rag_request::{QueryRequest, SearchResponse},
};

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<ApiResponse<SearchResponse>>> {
    let (question, course_id, opts) = body.into_parts();
    let passages = state.pipeline.search(&question, &course_id, opts).await?;
    Ok(Json(ApiResponse::success(SearchResponse { passages })))
}
