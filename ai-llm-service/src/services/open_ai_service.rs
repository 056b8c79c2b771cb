//! OpenAI service for chat completions and embeddings.
//!
//! Minimal, non-streaming client around the OpenAI REST API. Endpoints are
//! derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions: chat completion
//! - POST {endpoint}/v1/embeddings: one embedding vector
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error, info};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for the OpenAI API.
///
/// - [`OpenAiService::chat`]: system + user messages, returns text and token usage
/// - [`OpenAiService::embeddings`]: one embedding vector for one input
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
    timeout: Duration,
}

/// Token accounting reported by the chat endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Unwrapped chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub usage: TokenUsage,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http(s)
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/');
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
            timeout,
        })
    }

    /// Config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a non-streaming chat completion.
    ///
    /// `model` overrides `cfg.model` for this call only. Temperature, top_p
    /// and max_tokens always come from the config. A response without a
    /// `usage` block counts as zero tokens.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - `Decode` if the JSON cannot be parsed
    /// - `EmptyChoices` if no choice carries content
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        model: Option<&str>,
    ) -> Result<ChatCompletion, AiLlmError> {
        let started = Instant::now();
        let model = model.unwrap_or(&self.cfg.model);
        let body = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.cfg.temperature,
            top_p: self.cfg.top_p,
            max_tokens: self.cfg.max_tokens,
        };

        debug!(
            %model,
            system_len = system.len(),
            user_len = user.len(),
            "POST {}", self.url_chat
        );

        let out: ChatCompletionResponse = self
            .post_json(&self.url_chat, &body, "`choices[0].message.content`")
            .await?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))?;
        let usage = out.usage.unwrap_or_default();

        info!(
            %model,
            total_tokens = usage.total_tokens,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(ChatCompletion { content, usage })
    }

    /// Retrieves one embedding vector via `/v1/embeddings`.
    ///
    /// `model` overrides `cfg.model` for this call only. `dimensions` is
    /// forwarded for models that support shortened vectors.
    ///
    /// # Errors
    /// Same categories as [`OpenAiService::chat`]; an empty `data` array is a
    /// `Decode` error.
    pub async fn embeddings(
        &self,
        input: &str,
        model: Option<&str>,
        dimensions: Option<u32>,
    ) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let model = model.unwrap_or(&self.cfg.model);
        let body = EmbeddingsRequest {
            model,
            input,
            dimensions,
        };

        debug!(
            %model,
            input_len = input.len(),
            ?dimensions,
            "POST {}", self.url_embeddings
        );

        let out: EmbeddingsResponse = self
            .post_json(&self.url_embeddings, &body, "`data[0].embedding`")
            .await?;

        let first = out.data.into_iter().next().ok_or_else(|| {
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode("empty `data` in embeddings response".into()),
            )
        })?;

        debug!(
            %model,
            dim = first.embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );

        Ok(first.embedding)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B, expected: &str) -> Result<R, AiLlmError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(%url, timeout_secs = self.timeout.as_secs(), "OpenAI request timed out");
                    AiLlmError::Timeout(self.timeout)
                } else {
                    AiLlmError::HttpTransport(e)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI returned non-success status"
            );

            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url: url.to_string(),
                    snippet,
                }),
            )
            .into());
        }

        resp.json::<R>().await.map_err(|e| {
            error!(error = %e, %url, "failed to decode OpenAI response");
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected {expected}")),
            )
            .into()
        })
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}
