//! POST /embeddings/cost: heuristic price of embedding a set of texts.

use std::sync::Arc;

use axum::{Json, extract::State};
use rag_embed::estimate_tokens;
use serde::{Deserialize, Serialize};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct CostRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CostResponse {
    pub provider: &'static str,
    pub estimated_tokens: usize,
    pub estimated_cost_usd: f64,
}

/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/embeddings/cost \
///   -H 'content-type: application/json' \
///   -d '{"texts":["Ownership moves values.","Borrows are references."]}'
/// ```
pub async fn estimate_cost(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CostRequest>,
) -> AppResult<Json<ApiResponse<CostResponse>>> {
    if body.texts.is_empty() {
        return Err(AppError::BadRequest("texts must not be empty".into()));
    }
    let estimated_tokens = body.texts.iter().map(|t| estimate_tokens(t)).sum();
    Ok(Json(ApiResponse::success(CostResponse {
        provider: state.pipeline.embedding_provider().as_str(),
        estimated_tokens,
        estimated_cost_usd: state.pipeline.estimate_cost(&body.texts),
    })))
}
