//! The vector-store seam.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    config::StoreConfig,
    errors::RagError,
    qdrant_store::QdrantVectorStore,
    record::{MatchQuery, NewChunk, RetrievedPassage},
    rpc_store::RpcVectorStore,
};

/// External store holding indexed chunks.
///
/// Implementations never mutate or delete stored chunks.
pub trait VectorStore: Send + Sync {
    /// Ranked passages for `query.course_id` with similarity at or above
    /// `query.threshold`, at most `query.top_k`.
    fn match_embeddings<'a>(
        &'a self,
        query: &'a MatchQuery,
    ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>>;

    /// Persists one chunk and returns the id the store assigned.
    fn insert_chunk<'a>(&'a self, chunk: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Builds the backend described by `cfg`.
pub fn connect(cfg: &StoreConfig) -> Result<Arc<dyn VectorStore>, RagError> {
    Ok(match cfg {
        StoreConfig::Rpc(c) => Arc::new(RpcVectorStore::new(c.clone())?),
        StoreConfig::Qdrant(c) => Arc::new(QdrantVectorStore::new(c)?),
    })
}
