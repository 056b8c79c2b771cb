use crate::config::llm_provider::LlmProvider;

/// Configuration for one model endpoint.
///
/// The same struct describes the chat model and the embedding model; the
/// service built from it decides which fields apply.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4o-mini".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: Some(1000),
///     temperature: Some(0.3),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.model, "gpt-4o-mini");
/// ```
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Backend dialect.
    pub provider: LlmProvider,

    /// Default model identifier (e.g. `"gpt-4o-mini"`, `"text-embedding-3-small"`).
    pub model: String,

    /// Base URL without the `/v1/...` suffix.
    pub endpoint: String,

    /// Bearer token. Required by the OpenAI service.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
