//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("[RAG Store] config error: {0}")]
    Config(String),

    /// Transport failure talking to the RPC backend.
    #[error("[RAG Store] http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing / serialization errors.
    #[error("[RAG Store] parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store answered with a non-success status.
    #[error("[RAG Store] store returned HTTP {status}: {snippet}")]
    Store { status: u16, snippet: String },

    /// Qdrant client errors (wrapped).
    #[error("[RAG Store] qdrant error: {0}")]
    Qdrant(String),

    /// Vector length differs from the collection's.
    #[error("[RAG Store] vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },
}
