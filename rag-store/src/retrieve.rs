//! Ranked retrieval over a [`VectorStore`].

use std::{cmp::Ordering, sync::Arc, time::Instant};

use tracing::{debug, error};

use crate::{
    record::{MatchQuery, RagFilter, RetrievedPassage},
    store::VectorStore,
};

/// Fetches passages for a query vector and degrades to an empty list when
/// the store fails.
#[derive(Clone)]
pub struct ContextRetriever {
    store: Arc<dyn VectorStore>,
}

impl ContextRetriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Up to `top_k` passages of `course_id` with similarity at or above
    /// `threshold`, best first.
    ///
    /// The store's answer is re-sorted, filtered and truncated here as well.
    /// Store errors are logged and yield an empty list.
    pub async fn retrieve(
        &self,
        embedding: &[f32],
        course_id: &str,
        top_k: usize,
        threshold: f64,
        filter: Option<RagFilter>,
    ) -> Vec<RetrievedPassage> {
        if top_k == 0 {
            return Vec::new();
        }
        let started = Instant::now();
        let query = MatchQuery {
            embedding: embedding.to_vec(),
            course_id: course_id.to_string(),
            top_k,
            threshold,
            filter: filter.filter(|f| !f.is_empty()),
        };

        let mut passages = match self.store.match_embeddings(&query).await {
            Ok(p) => p,
            Err(e) => {
                error!(
                    store = self.store.name(),
                    %course_id,
                    error = %e,
                    "retrieval failed; continuing without context"
                );
                return Vec::new();
            }
        };

        passages.retain(|p| p.similarity.is_finite() && meets_threshold(p.similarity, threshold));
        passages.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        passages.truncate(top_k);

        debug!(
            store = self.store.name(),
            %course_id,
            hits = passages.len(),
            latency_ms = started.elapsed().as_millis(),
            "retrieval completed"
        );
        passages
    }
}

/// Threshold check at `f32` precision, the precision backend scores are
/// computed in. A score widened from `f32` must not fall below the threshold
/// it already passed upstream.
fn meets_threshold(similarity: f64, threshold: f64) -> bool {
    similarity as f32 >= threshold as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::RagError, record::NewChunk};
    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};
    use std::sync::Mutex;

    struct ScriptedStore {
        result: Mutex<Option<Result<Vec<RetrievedPassage>, RagError>>>,
        seen: Mutex<Vec<MatchQuery>>,
    }

    impl ScriptedStore {
        fn new(result: Result<Vec<RetrievedPassage>, RagError>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl VectorStore for ScriptedStore {
        fn match_embeddings<'a>(
            &'a self,
            query: &'a MatchQuery,
        ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>> {
            self.seen.lock().unwrap().push(query.clone());
            let out = self.result.lock().unwrap().take().unwrap_or(Ok(Vec::new()));
            Box::pin(async move { out })
        }

        fn insert_chunk<'a>(&'a self, _: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>> {
            Box::pin(async { Ok("unused".to_string()) })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn passage(id: &str, similarity: f64) -> RetrievedPassage {
        RetrievedPassage {
            id: id.into(),
            content: format!("text {id}"),
            similarity,
            metadata: Map::new(),
        }
    }

    #[tokio::test]
    async fn store_failure_yields_empty_list() {
        let store = ScriptedStore::new(Err(RagError::Store {
            status: 503,
            snippet: "down".into(),
        }));
        let r = ContextRetriever::new(store);
        assert!(r.retrieve(&[1.0], "c", 5, 0.7, None).await.is_empty());
    }

    #[tokio::test]
    async fn results_are_sorted_thresholded_and_truncated() {
        let store = ScriptedStore::new(Ok(vec![
            passage("low", 0.5),
            passage("b", 0.8),
            passage("a", 0.95),
            passage("c", 0.75),
        ]));
        let r = ContextRetriever::new(store.clone());

        let out = r.retrieve(&[1.0, 0.0], "rust-101", 2, 0.7, None).await;
        let ids: Vec<&str> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0].course_id, "rust-101");
        assert_eq!(seen[0].top_k, 2);
        assert_eq!(seen[0].threshold, 0.7);
        assert_eq!(seen[0].filter, None);
    }

    #[tokio::test]
    async fn non_empty_filters_are_forwarded() {
        let store = ScriptedStore::new(Ok(Vec::new()));
        let r = ContextRetriever::new(store.clone());
        let filter = RagFilter {
            equals: vec![("kind".into(), json!("quiz"))],
        };
        r.retrieve(&[1.0], "c", 3, 0.1, Some(filter.clone())).await;
        r.retrieve(&[1.0], "c", 3, 0.1, Some(RagFilter::default())).await;

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0].filter, Some(filter));
        assert_eq!(seen[1].filter, None);
    }

    #[tokio::test]
    async fn score_widened_from_f32_still_meets_its_threshold() {
        let widened = f64::from(0.7f32);
        assert!(widened < 0.7);
        let store = ScriptedStore::new(Ok(vec![passage("edge", widened), passage("below", 0.69)]));
        let r = ContextRetriever::new(store);

        let out = r.retrieve(&[1.0], "c", 5, 0.7, None).await;
        let ids: Vec<&str> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["edge"]);
    }
}
