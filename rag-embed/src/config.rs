//! Embedding settings resolved from the environment.
//!
//! | Variable                         | Default                         |
//! |----------------------------------|---------------------------------|
//! | `EMBEDDING_PROVIDER`             | `openai`                        |
//! | `EMBEDDING_MODEL`                | provider default                |
//! | `EMBEDDING_DIM`                  | provider default                |
//! | `EMBEDDING_CACHE`                | `true`                          |
//! | `EMBEDDING_CACHE_CAPACITY`       | `1000`                          |
//! | `EMBEDDING_MAX_RETRIES`          | `3`                             |
//! | `EMBEDDING_RETRY_DELAY_MS`       | `1000`                          |
//! | `EMBEDDING_EXPONENTIAL_BACKOFF`  | `true`                          |
//! | `EMBEDDING_BATCH_SIZE`           | `20`                            |
//! | `EMBEDDING_PARALLEL`             | `true`                          |

use std::time::Duration;

use ai_llm_service::error_handler::{env_non_empty, env_opt_bool, env_opt_u32, env_opt_u64};

use crate::{
    batch::BatchOptions, errors::EmbedError, provider::EmbeddingProviderKind, retry::RetryPolicy,
};

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub dimensions: usize,
    pub cache_enabled: bool,
    pub cache_capacity: usize,
    pub retry: RetryPolicy,
    pub batch: BatchOptions,
}

impl EmbeddingConfig {
    /// Defaults for `provider` without consulting the environment.
    pub fn for_provider(provider: EmbeddingProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            dimensions: provider.default_dimensions(),
            cache_enabled: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry: RetryPolicy::default(),
            batch: BatchOptions::default(),
        }
    }

    /// Reads the variables listed in the module docs.
    ///
    /// # Errors
    /// - [`EmbedError::UnsupportedProvider`] for an unknown provider name
    /// - [`EmbedError::InvalidConfig`] for malformed numbers or booleans, or a
    ///   zero dimension, cache capacity or batch size
    pub fn from_env() -> Result<Self, EmbedError> {
        let provider = EmbeddingProviderKind::from_kind(
            &env_non_empty("EMBEDDING_PROVIDER").unwrap_or_else(|| "openai".into()),
        )?;
        let mut cfg = Self::for_provider(provider);

        if let Some(model) = env_non_empty("EMBEDDING_MODEL") {
            cfg.model = model;
        }
        if let Some(dim) = env_opt_u32("EMBEDDING_DIM").map_err(invalid)? {
            cfg.dimensions = dim as usize;
        }
        if let Some(on) = env_opt_bool("EMBEDDING_CACHE").map_err(invalid)? {
            cfg.cache_enabled = on;
        }
        if let Some(cap) = env_opt_u32("EMBEDDING_CACHE_CAPACITY").map_err(invalid)? {
            cfg.cache_capacity = cap as usize;
        }

        let max_retries = env_opt_u32("EMBEDDING_MAX_RETRIES")
            .map_err(invalid)?
            .unwrap_or(3);
        let delay_ms = env_opt_u64("EMBEDDING_RETRY_DELAY_MS")
            .map_err(invalid)?
            .unwrap_or(1000);
        let exponential = env_opt_bool("EMBEDDING_EXPONENTIAL_BACKOFF")
            .map_err(invalid)?
            .unwrap_or(true);
        cfg.retry = RetryPolicy::new(max_retries, Duration::from_millis(delay_ms), exponential);

        if let Some(size) = env_opt_u32("EMBEDDING_BATCH_SIZE").map_err(invalid)? {
            cfg.batch.batch_size = size as usize;
        }
        if let Some(parallel) = env_opt_bool("EMBEDDING_PARALLEL").map_err(invalid)? {
            cfg.batch.parallel = parallel;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.dimensions == 0 {
            return Err(EmbedError::InvalidConfig("EMBEDDING_DIM must be > 0".into()));
        }
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(EmbedError::InvalidConfig(
                "EMBEDDING_CACHE_CAPACITY must be > 0 when caching is on".into(),
            ));
        }
        if self.batch.batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "EMBEDDING_BATCH_SIZE must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn invalid(e: ai_llm_service::AiLlmError) -> EmbedError {
    EmbedError::InvalidConfig(e.to_string())
}
