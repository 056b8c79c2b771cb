//! Default model configs loaded strictly from environment variables.
//!
//! Two roles are used by the RAG pipeline:
//!
//! - **Chat** → answer synthesis
//! - **Embedding** → vectors for indexing and querying
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`          = provider kind (default `openai`)
//! - `OPENAI_API_KEY`    = bearer token (mandatory)
//! - `OPENAI_BASE_URL`   = endpoint (default `https://api.openai.com`)
//! - `LLM_TIMEOUT_SECS`  = request timeout (default 60)
//!
//! Chat-specific:
//! - `CHAT_MODEL`        = default chat model (default `gpt-4o-mini`)
//! - `CHAT_TEMPERATURE`  = sampling temperature (default 0.3, range 0..=2)
//! - `LLM_MAX_TOKENS`    = completion cap (default 1000)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, env_non_empty, env_opt_f32, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn provider() -> Result<LlmProvider, AiLlmError> {
    let kind = env_non_empty("LLM_KIND").unwrap_or_else(|| "openai".to_string());
    Ok(LlmProvider::from_kind(&kind)?)
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_non_empty("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into());
    validate_http_endpoint("OPENAI_BASE_URL", &url)?;
    Ok(url)
}

/// Constructs the config for the **chat** model used to synthesize answers.
///
/// # Errors
/// - `MissingVar("OPENAI_API_KEY")` when the key is absent
/// - `InvalidNumber`/`OutOfRange` for malformed numeric variables
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider()?;
    let endpoint = openai_endpoint()?;
    let api_key = must_env("OPENAI_API_KEY")?;
    let model = env_non_empty("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.into());

    let temperature = env_opt_f32("CHAT_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Constructs the config for the **embedding** model.
///
/// The model name comes from the embedding layer, which owns per-provider
/// defaults; only transport settings are read here.
///
/// # Defaults
/// - `temperature = Some(0.0)` (unused by embeddings, kept deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_openai_embedding(model: impl Into<String>) -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider()?;
    let endpoint = openai_endpoint()?;
    let api_key = must_env("OPENAI_API_KEY")?;

    Ok(LlmModelConfig {
        provider,
        model: model.into(),
        endpoint,
        api_key: Some(api_key),
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(30)),
    })
}
