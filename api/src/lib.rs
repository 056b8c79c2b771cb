use std::sync::Arc;

pub mod core;
pub mod error_handler;
mod middleware_layer;
pub mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        embeddings_cost_route::estimate_cost,
        health_route::health,
        rag::{
            index_route::{index_batch, index_chunk},
            query_route::query,
            search_route::search,
        },
    },
};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// All routes with shared state and the JSON rejection mapper.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rag/query", post(query))
        .route("/rag/search", post(search))
        .route("/rag/index", post(index_chunk))
        .route("/rag/index/batch", post(index_batch))
        .route("/embeddings/cost", post(estimate_cost))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Binds `API_ADDRESS` (default [`DEFAULT_API_ADDRESS`]) and serves until Ctrl+C.
pub async fn start(state: Arc<AppState>) -> Result<(), AppError> {
    let host_url = std::env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("HTTP API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support;
