//! Vector-store access for the RAG pipeline.
//!
//! This crate provides:
//! - [`VectorStore`]: the seam the pipeline talks to (`match_embeddings` + `insert_chunk`)
//! - [`RpcVectorStore`]: PostgREST `rpc/match_embeddings` backend
//! - [`QdrantVectorStore`]: the same contract over `qdrant-client`
//! - [`ContextRetriever`]: ranked retrieval that degrades to an empty list on failure

mod config;
mod errors;
mod filters;
mod ids;
mod qdrant_store;
mod record;
mod retrieve;
mod rpc_store;
mod store;

pub use config::{QdrantConfig, RpcConfig, StoreBackend, StoreConfig};
pub use errors::RagError;
pub use ids::stable_chunk_id;
pub use qdrant_store::QdrantVectorStore;
pub use record::{MatchQuery, NewChunk, RagFilter, RetrievedPassage};
pub use retrieve::ContextRetriever;
pub use rpc_store::RpcVectorStore;
pub use store::{VectorStore, connect};
