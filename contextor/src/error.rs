//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Embedding the question or the content failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] rag_embed::EmbedError),

    /// The generative model call failed.
    #[error("generation error: {0}")]
    Generation(#[from] ai_llm_service::AiLlmError),

    /// Persisting a chunk failed; there is no degraded mode for indexing.
    #[error("indexing failed: {0}")]
    IndexingFailed(#[source] rag_store::RagError),

    /// Caller supplied an empty or out-of-range argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Environment-driven wiring failed.
    #[error("config error: {0}")]
    Config(String),
}
