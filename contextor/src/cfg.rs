//! Runtime configuration loaded from environment variables.

use ai_llm_service::error_handler::{env_non_empty, env_opt_u32, parse_opt};

use crate::error::ContextorError;

/// Query knobs used when a call does not override them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryDefaults {
    pub top_k: usize,
    pub similarity_threshold: f64,
    pub max_context_tokens: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.7,
            max_context_tokens: 3000,
        }
    }
}

impl QueryDefaults {
    /// Reads `RAG_TOP_K`, `RAG_SIMILARITY_THRESHOLD`, `RAG_MAX_CONTEXT_TOKENS`.
    pub fn from_env() -> Result<Self, ContextorError> {
        let d = Self::default();
        let cfg = Self {
            top_k: env_opt_u32("RAG_TOP_K")
                .map_err(config)?
                .map_or(d.top_k, |v| v as usize),
            similarity_threshold: parse_opt::<f64>(
                "RAG_SIMILARITY_THRESHOLD",
                env_non_empty("RAG_SIMILARITY_THRESHOLD").as_deref(),
                "expected a float",
            )
            .map_err(config)?
            .unwrap_or(d.similarity_threshold),
            max_context_tokens: env_opt_u32("RAG_MAX_CONTEXT_TOKENS")
                .map_err(config)?
                .map_or(d.max_context_tokens, |v| v as usize),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ContextorError> {
        validate_knobs(self.top_k, self.similarity_threshold).map_err(ContextorError::Config)
    }
}

/// Shared range checks for configured and per-call knobs.
pub(crate) fn validate_knobs(top_k: usize, threshold: f64) -> Result<(), String> {
    if top_k == 0 {
        return Err("top_k must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("similarity threshold {threshold} is outside 0..=1"));
    }
    Ok(())
}

fn config(e: ai_llm_service::AiLlmError) -> ContextorError {
    ContextorError::Config(e.to_string())
}
