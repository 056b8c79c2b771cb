use std::sync::Arc;

use ai_llm_service::telemetry;
use api::core::app_state::AppState;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env file.
    dotenvy::dotenv().ok();

    let filter: EnvFilter = telemetry::env_filter_with_level("warn", Level::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer())
        .try_init()?;

    let state = Arc::new(AppState::from_env()?);
    info!(backend = state.backend_name(), "RAG backend configured");

    api::start(state).await?;

    Ok(())
}
