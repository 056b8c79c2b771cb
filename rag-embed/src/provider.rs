//! Embedding providers.
//!
//! [`EmbeddingProviderKind`] names the supported backends with their default
//! model, dimensionality and price. [`Embedder`] is the one concrete
//! [`EmbeddingsProvider`]: cache lookup, then the network call wrapped in a
//! [`RetryPolicy`], then a dimension check and a cache insert.

use std::{fmt, sync::Arc};

use ai_llm_service::{
    OpenAiService, config::default_config::config_openai_embedding,
};
use futures::future::BoxFuture;
use tracing::{debug, info, trace};

use crate::{
    batch::{BatchOptions, run_batches},
    cache::EmbeddingCache,
    config::EmbeddingConfig,
    errors::EmbedError,
    retry::RetryPolicy,
    tokens::estimate_tokens,
};

/// Known embedding backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingProviderKind {
    OpenAI,
    Cohere,
    HuggingFace,
}

impl EmbeddingProviderKind {
    /// Parses `openai`, `cohere` or `huggingface` (case-insensitive).
    pub fn from_kind(kind: &str) -> Result<Self, EmbedError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "cohere" => Ok(Self::Cohere),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(EmbedError::UnsupportedProvider(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Cohere => "cohere",
            Self::HuggingFace => "huggingface",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "text-embedding-3-small",
            Self::Cohere => "embed-english-v3.0",
            Self::HuggingFace => "sentence-transformers/all-MiniLM-L6-v2",
        }
    }

    pub fn default_dimensions(self) -> usize {
        match self {
            Self::OpenAI => 1536,
            Self::Cohere => 1024,
            Self::HuggingFace => 384,
        }
    }

    /// USD per one million input tokens.
    pub fn cost_per_million_tokens(self) -> f64 {
        match self {
            Self::OpenAI => 0.02,
            Self::Cohere => 0.10,
            Self::HuggingFace => 0.0,
        }
    }

    /// Heuristic cost of embedding `texts`, using four characters per token.
    pub fn estimate_cost<S: AsRef<str>>(self, texts: &[S]) -> f64 {
        let tokens: usize = texts.iter().map(|t| estimate_tokens(t.as_ref())).sum();
        tokens as f64 / 1_000_000.0 * self.cost_per_million_tokens()
    }
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw network operation behind a provider: one text in, one vector out.
pub trait EmbeddingClient: Send + Sync {
    fn embed_raw<'a>(
        &'a self,
        model: &'a str,
        text: &'a str,
        dimensions: usize,
    ) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>>;
}

impl EmbeddingClient for OpenAiService {
    fn embed_raw<'a>(
        &'a self,
        model: &'a str,
        text: &'a str,
        dimensions: usize,
    ) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>> {
        Box::pin(async move {
            let dims = u32::try_from(dimensions).map_err(|_| {
                EmbedError::InvalidConfig(format!("dimensions {dimensions} exceed u32"))
            })?;
            Ok(self.embeddings(text, Some(model), Some(dims)).await?)
        })
    }
}

/// Capability shared by everything that turns text into a vector.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>>;

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    fn model(&self) -> &str;

    /// Variant used for cost estimates.
    fn kind(&self) -> EmbeddingProviderKind;
}

/// Cached, retrying embedder for one provider variant.
pub struct Embedder {
    kind: EmbeddingProviderKind,
    model: String,
    dimensions: usize,
    client: Arc<dyn EmbeddingClient>,
    cache: Option<EmbeddingCache>,
    retry: RetryPolicy,
}

impl fmt::Debug for Embedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Embedder")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("cache", &self.cache.as_ref().map(|c| c.capacity()))
            .field("retry", &self.retry)
            .finish()
    }
}

impl Embedder {
    /// Embedder with the variant's default model and dimensions, no cache
    /// and the default retry policy.
    ///
    /// # Errors
    /// [`EmbedError::UnsupportedProvider`] for variants without a backend.
    pub fn new(
        kind: EmbeddingProviderKind,
        client: Arc<dyn EmbeddingClient>,
    ) -> Result<Self, EmbedError> {
        if kind != EmbeddingProviderKind::OpenAI {
            return Err(EmbedError::UnsupportedProvider(kind.to_string()));
        }
        Ok(Self {
            kind,
            model: kind.default_model().to_string(),
            dimensions: kind.default_dimensions(),
            client,
            cache: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Builds the OpenAI client and embedder described by `cfg`.
    pub fn from_config(cfg: &EmbeddingConfig) -> Result<Self, EmbedError> {
        if cfg.provider != EmbeddingProviderKind::OpenAI {
            return Err(EmbedError::UnsupportedProvider(cfg.provider.to_string()));
        }
        let svc = OpenAiService::new(config_openai_embedding(cfg.model.clone())?)?;
        let mut embedder = Self::new(cfg.provider, Arc::new(svc))?
            .with_model(cfg.model.clone())
            .with_dimensions(cfg.dimensions)
            .with_retry(cfg.retry);
        if cfg.cache_enabled {
            embedder = embedder.with_cache(cfg.cache_capacity);
        }
        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            dimensions = cfg.dimensions,
            cache = cfg.cache_enabled,
            "embedder configured"
        );
        Ok(embedder)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = Some(EmbeddingCache::new(capacity));
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> Option<&EmbeddingCache> {
        self.cache.as_ref()
    }

    pub fn estimate_cost<S: AsRef<str>>(&self, texts: &[S]) -> f64 {
        self.kind.estimate_cost(texts)
    }

    /// Embeds `texts` in order; see [`run_batches`].
    pub async fn embed_batch<S, P>(
        &self,
        texts: &[S],
        opts: BatchOptions,
        on_progress: P,
    ) -> Result<Vec<Vec<f32>>, EmbedError>
    where
        S: AsRef<str> + Sync,
        P: FnMut(u32),
    {
        run_batches(self, texts, opts, on_progress).await
    }

    async fn embed_uncached(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let v = self
            .retry
            .run(|attempt| {
                trace!(attempt, model = %self.model, "requesting embedding");
                self.client.embed_raw(&self.model, text, self.dimensions)
            })
            .await?;

        if v.len() != self.dimensions {
            return Err(EmbedError::VectorSizeMismatch {
                got: v.len(),
                want: self.dimensions,
            });
        }
        Ok(v)
    }
}

impl EmbeddingsProvider for Embedder {
    // Concurrent misses for the same text each reach the backend; the last
    // writer wins in the cache.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>> {
        Box::pin(async move {
            if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(text)) {
                return Ok(hit);
            }

            let v = self.embed_uncached(text).await?;
            debug!(model = %self.model, dim = v.len(), "embedding generated");

            if let Some(cache) = &self.cache {
                cache.put(text, v.clone());
            }
            Ok(v)
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> EmbeddingProviderKind {
        self.kind
    }
}
