//! Shared client layer for the generative model and the embedding backend.
//!
//! - [`config`]: typed model configs resolved strictly from environment
//! - [`error_handler`]: the unified [`AiLlmError`] and env/validation helpers
//! - [`services`]: thin REST clients (OpenAI-compatible)
//! - [`telemetry`]: tracing layer and filters used by the binary

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use services::open_ai_service::{ChatCompletion, OpenAiService, TokenUsage};
