//! Qdrant backend.
//!
//! Concentrates all `qdrant-client` usage behind the [`VectorStore`] contract:
//! - course scoping and metadata equalities become `must` conditions
//! - the similarity threshold is sent as `score_threshold`
//! - point ids are deterministic UUIDv5 values (see [`stable_chunk_id`])
//! - the collection is created with cosine distance on first insert

use std::collections::HashMap;

use futures::future::BoxFuture;
use qdrant_client::{Payload, Qdrant};
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    point_id::PointIdOptions,
};
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{
    config::QdrantConfig,
    errors::RagError,
    filters::to_qdrant_filter,
    ids::stable_chunk_id,
    record::{MatchQuery, NewChunk, RetrievedPassage},
    store::VectorStore,
};

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    exact_search: bool,
    /// Vector size of the collection once it is known to exist.
    ensured: OnceCell<usize>,
}

impl QdrantVectorStore {
    /// # Errors
    /// `Config` for invalid settings, `Qdrant` if the client cannot be built.
    pub fn new(cfg: &QdrantConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(url = %cfg.url, collection = %cfg.collection, "Qdrant vector store ready");
        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            exact_search: cfg.exact_search,
            ensured: OnceCell::new(),
        })
    }

    /// Creates the collection with cosine distance if it does not exist yet.
    pub async fn ensure_collection(&self, size: usize) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(format!("collection_exists: {e}")))?;
        if exists {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(());
        }

        warn!(collection = %self.collection, size, "collection missing, creating");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(size as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| RagError::Qdrant(format!("create_collection: {e}")))?;

        info!(collection = %self.collection, size, "collection created");
        Ok(())
    }

    async fn ensured_size(&self, size: usize) -> Result<usize, RagError> {
        self.ensured
            .get_or_try_init(|| async {
                self.ensure_collection(size).await?;
                Ok::<usize, RagError>(size)
            })
            .await
            .copied()
    }
}

fn chunk_payload(chunk: &NewChunk) -> Result<Payload, RagError> {
    json!({
        "course_id": chunk.course_id,
        "chapter_id": chunk.chapter_id,
        "content_type": chunk.content_type,
        "content_text": chunk.content,
        "metadata": chunk.metadata,
    })
    .try_into()
    .map_err(|e| RagError::Qdrant(format!("payload convert: {e}")))
}

fn take_json(payload: &mut HashMap<String, QValue>, key: &str) -> Value {
    payload
        .remove(key)
        .map(|v| v.into_json())
        .unwrap_or(Value::Null)
}

fn scored_point_to_passage(mut sp: ScoredPoint) -> RetrievedPassage {
    let id = match sp.id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(s)) => s,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };
    let content = match take_json(&mut sp.payload, "content_text") {
        Value::String(s) => s,
        _ => String::new(),
    };
    let metadata = match take_json(&mut sp.payload, "metadata") {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    RetrievedPassage {
        id,
        content,
        similarity: f64::from(sp.score),
        metadata,
    }
}

impl VectorStore for QdrantVectorStore {
    fn match_embeddings<'a>(
        &'a self,
        query: &'a MatchQuery,
    ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>> {
        Box::pin(async move {
            debug!(
                collection = %self.collection,
                course_id = %query.course_id,
                top_k = query.top_k,
                threshold = query.threshold,
                "searching"
            );

            let mut builder = SearchPointsBuilder::new(
                &self.collection,
                query.embedding.clone(),
                query.top_k as u64,
            )
            .with_payload(true)
            .score_threshold(query.threshold as f32)
            .filter(to_qdrant_filter(&query.course_id, query.filter.as_ref()));
            if self.exact_search {
                builder = builder.params(SearchParamsBuilder::default().exact(true));
            }

            let res = self
                .client
                .search_points(builder)
                .await
                .map_err(|e| RagError::Qdrant(format!("search_points: {e}")))?;

            let out: Vec<RetrievedPassage> =
                res.result.into_iter().map(scored_point_to_passage).collect();
            debug!(hits = out.len(), "search completed");
            Ok(out)
        })
    }

    fn insert_chunk<'a>(&'a self, chunk: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>> {
        Box::pin(async move {
            let want = self.ensured_size(chunk.embedding.len()).await?;
            if chunk.embedding.len() != want {
                return Err(RagError::VectorSizeMismatch {
                    got: chunk.embedding.len(),
                    want,
                });
            }

            let id = stable_chunk_id(
                &chunk.course_id,
                chunk.chapter_id.as_deref(),
                &chunk.content_type,
                &chunk.content,
            );
            let point = PointStruct::new(id.clone(), chunk.embedding.clone(), chunk_payload(chunk)?);

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
                .await
                .map_err(|e| RagError::Qdrant(format!("upsert_points: {e}")))?;

            debug!(%id, course_id = %chunk.course_id, "chunk upserted");
            Ok(id)
        })
    }

    fn name(&self) -> &'static str {
        "qdrant"
    }
}
