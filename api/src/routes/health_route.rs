//! GET /health: liveness plus the configured vector backend.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub embedding_provider: &'static str,
    pub uptime_secs: i64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        store: state.backend_name(),
        embedding_provider: state.pipeline.embedding_provider().as_str(),
        uptime_secs,
    }))
}
