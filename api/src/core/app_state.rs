use chrono::{DateTime, Utc};
use contextor::RagPipeline;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RagPipeline,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self {
            pipeline,
            started_at: Utc::now(),
        }
    }

    /// Builds the pipeline from environment variables.
    ///
    /// # Errors
    /// `AppError::Config` when a credential is missing or a knob is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        let pipeline = RagPipeline::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self::new(pipeline))
    }

    pub fn backend_name(&self) -> &'static str {
        self.pipeline.store_name()
    }
}
