//! Error types for embedding generation.

use thiserror::Error;

/// Two vectors of different length were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("[RAG Embed] dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Unified error for the embedding layer.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatch),

    /// Provider variant is declared but has no backend.
    #[error("[RAG Embed] provider not implemented: {0}")]
    UnsupportedProvider(String),

    /// The embedding backend failed after all retries.
    #[error("[RAG Embed] upstream error: {0}")]
    Upstream(#[from] ai_llm_service::AiLlmError),

    /// Backend returned a vector of unexpected length.
    #[error("[RAG Embed] vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    #[error("[RAG Embed] invalid configuration: {0}")]
    InvalidConfig(String),
}
