//! PostgREST backend.
//!
//! - match:  `POST {url}/rest/v1/rpc/{match_fn}`
//!   body `{query_embedding, match_threshold, match_count, filter_course_id, filter}`
//! - insert: `POST {url}/rest/v1/{table}` with `Prefer: return=representation`,
//!   answered by `[{"id": ...}]`

use std::time::{Duration, Instant};

use ai_llm_service::error_handler::make_snippet;
use futures::future::BoxFuture;
use reqwest::header;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::{
    config::RpcConfig,
    errors::RagError,
    record::{MatchQuery, NewChunk, RetrievedPassage},
    store::VectorStore,
};

pub struct RpcVectorStore {
    client: reqwest::Client,
    url_match: String,
    url_insert: String,
}

impl std::fmt::Debug for RpcVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcVectorStore")
            .field("url_match", &self.url_match)
            .field("url_insert", &self.url_insert)
            .finish()
    }
}

impl RpcVectorStore {
    /// # Errors
    /// `Config` for an invalid URL or key, `Http` if the client cannot be built.
    pub fn new(cfg: RpcConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut headers = header::HeaderMap::new();
        let mut apikey = header::HeaderValue::from_str(&cfg.key)
            .map_err(|e| RagError::Config(format!("invalid VECTOR_STORE_KEY: {e}")))?;
        apikey.set_sensitive(true);
        let mut bearer = header::HeaderValue::from_str(&format!("Bearer {}", cfg.key))
            .map_err(|e| RagError::Config(format!("invalid VECTOR_STORE_KEY: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(header::AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        let base = cfg.url.trim_end_matches('/');
        let store = Self {
            client,
            url_match: format!("{base}/rest/v1/rpc/{}", cfg.match_fn),
            url_insert: format!("{base}/rest/v1/{}", cfg.table),
        };
        info!(url_match = %store.url_match, url_insert = %store.url_insert, "RPC vector store ready");
        Ok(store)
    }

    async fn post<B, R>(&self, url: &str, body: &B, prefer: Option<&'static str>) -> Result<R, RagError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let mut req = self.client.post(url).json(body);
        if let Some(p) = prefer {
            req = req.header("Prefer", p);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "vector store returned non-success status");
            return Err(RagError::Store {
                status: status.as_u16(),
                snippet,
            });
        }

        let bytes = resp.bytes().await?;
        let out = serde_json::from_slice::<R>(&bytes).map_err(|e| {
            error!(error = %e, %url, "failed to decode vector store response");
            RagError::Parse(e)
        })?;
        debug!(%url, latency_ms = started.elapsed().as_millis(), "vector store call completed");
        Ok(out)
    }
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_threshold: f64,
    match_count: usize,
    filter_course_id: &'a str,
    filter: Map<String, Value>,
}

#[derive(Deserialize)]
struct MatchRow {
    id: Value,
    #[serde(alias = "content_text")]
    content: String,
    similarity: f64,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct InsertRow<'a> {
    course_id: &'a str,
    chapter_id: Option<&'a str>,
    content_type: &'a str,
    content_text: &'a str,
    embedding: &'a [f32],
    metadata: &'a Map<String, Value>,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: Value,
}

/// Ids may come back as UUID strings or bigints.
fn id_to_string(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl VectorStore for RpcVectorStore {
    fn match_embeddings<'a>(
        &'a self,
        query: &'a MatchQuery,
    ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>> {
        Box::pin(async move {
            let body = MatchRequest {
                query_embedding: &query.embedding,
                match_threshold: query.threshold,
                match_count: query.top_k,
                filter_course_id: &query.course_id,
                filter: query
                    .filter
                    .as_ref()
                    .map(|f| f.to_json_object())
                    .unwrap_or_default(),
            };
            debug!(
                course_id = %query.course_id,
                top_k = query.top_k,
                threshold = query.threshold,
                "POST {}", self.url_match
            );

            let rows: Vec<MatchRow> = self.post(&self.url_match, &body, None).await?;
            Ok(rows
                .into_iter()
                .map(|r| RetrievedPassage {
                    id: id_to_string(r.id),
                    content: r.content,
                    similarity: r.similarity,
                    metadata: r.metadata.unwrap_or_default(),
                })
                .collect())
        })
    }

    fn insert_chunk<'a>(&'a self, chunk: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>> {
        Box::pin(async move {
            let row = InsertRow {
                course_id: &chunk.course_id,
                chapter_id: chunk.chapter_id.as_deref(),
                content_type: &chunk.content_type,
                content_text: &chunk.content,
                embedding: &chunk.embedding,
                metadata: &chunk.metadata,
            };
            let inserted: Vec<InsertedRow> = self
                .post(&self.url_insert, &row, Some("return=representation"))
                .await?;

            let id = inserted
                .into_iter()
                .next()
                .map(|r| id_to_string(r.id))
                .ok_or_else(|| RagError::Store {
                    status: 200,
                    snippet: "insert returned no rows".into(),
                })?;
            debug!(%id, course_id = %chunk.course_id, "chunk inserted");
            Ok(id)
        })
    }

    fn name(&self) -> &'static str {
        "rpc"
    }
}
