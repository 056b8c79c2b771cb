use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use rag_embed::EmbedError;
use thiserror::Error;
use tracing::error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, code = self.error_code(), error = %self, "request failed");
        }
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Maps pipeline failures to HTTP status and stable codes.
impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        let (status, code) = match &err {
            ContextorError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT"),
            ContextorError::Embedding(EmbedError::UnsupportedProvider(_)) => {
                (StatusCode::NOT_IMPLEMENTED, "UNSUPPORTED_PROVIDER")
            }
            ContextorError::Embedding(_) => (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILED"),
            ContextorError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
            ContextorError::IndexingFailed(_) => (StatusCode::BAD_GATEWAY, "INDEXING_FAILED"),
            ContextorError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        };
        AppError::Http {
            status,
            code,
            message: err.to_string(),
        }
    }
}
