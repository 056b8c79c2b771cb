//! Embedding generation for the RAG pipeline.
//!
//! Layers, leaves first:
//! - [`vector_math`]: dot product, magnitude, cosine similarity, euclidean distance
//! - [`retry`]: bounded retries with optional exponential backoff
//! - [`cache`]: fixed-capacity FIFO map from text to vector
//! - [`provider`]: provider variants and the cache → retry → network [`Embedder`]
//! - [`batch`]: ordered batch embedding with progress callbacks

pub mod batch;
pub mod cache;
pub mod config;
pub mod errors;
pub mod provider;
pub mod retry;
pub mod tokens;
pub mod vector_math;

pub use batch::{BatchOptions, run_batches};
pub use cache::EmbeddingCache;
pub use config::EmbeddingConfig;
pub use errors::{DimensionMismatch, EmbedError};
pub use provider::{Embedder, EmbeddingClient, EmbeddingProviderKind, EmbeddingsProvider};
pub use retry::RetryPolicy;
pub use tokens::estimate_tokens;
