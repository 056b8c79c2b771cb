use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use ai_llm_service::{AiLlmError, ChatCompletion, TokenUsage};
use contextor::{
    ContextorError, IndexRequest, NO_CONTEXT_ANSWER, QueryDefaults, QueryOptions, RagPipeline,
    prompt::SYSTEM_PROMPT,
};
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use rag_embed::{EmbedError, EmbeddingProviderKind, EmbeddingsProvider};
use rag_store::{MatchQuery, NewChunk, RagError, RetrievedPassage, VectorStore};
use serde_json::{Map, json};

struct FakeEmbedder {
    calls: AtomicUsize,
}

impl EmbeddingsProvider for FakeEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let v = vec![text.len() as f32, 1.0];
        Box::pin(async move { Ok(v) })
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model(&self) -> &str {
        "fake"
    }

    fn kind(&self) -> EmbeddingProviderKind {
        EmbeddingProviderKind::OpenAI
    }
}

#[derive(Default)]
struct FakeStore {
    passages: Vec<RetrievedPassage>,
    fail_match: bool,
    fail_insert_at: Option<usize>,
    inserted: Mutex<Vec<NewChunk>>,
    queries: Mutex<Vec<MatchQuery>>,
}

impl VectorStore for FakeStore {
    fn match_embeddings<'a>(
        &'a self,
        query: &'a MatchQuery,
    ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>> {
        self.queries.lock().unwrap().push(query.clone());
        let out = if self.fail_match {
            Err(RagError::Store {
                status: 500,
                snippet: "boom".into(),
            })
        } else {
            Ok(self.passages.clone())
        };
        Box::pin(async move { out })
    }

    fn insert_chunk<'a>(&'a self, chunk: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>> {
        let mut inserted = self.inserted.lock().unwrap();
        let n = inserted.len();
        let out = if self.fail_insert_at == Some(n) {
            Err(RagError::Store {
                status: 409,
                snippet: "conflict".into(),
            })
        } else {
            inserted.push(chunk.clone());
            Ok(format!("id-{n}"))
        };
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeChat {
    answer: String,
    calls: Mutex<Vec<(String, String, Option<String>)>>,
}

impl contextor::ChatModel for FakeChat {
    fn chat<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        model: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>> {
        self.calls
            .lock()
            .unwrap()
            .push((system.into(), user.into(), model.map(String::from)));
        let out = ChatCompletion {
            content: self.answer.clone(),
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            },
        };
        Box::pin(async move { Ok(out) })
    }
}

fn passage(id: &str, content: &str, similarity: f64) -> RetrievedPassage {
    let mut metadata = Map::new();
    metadata.insert("chapter".into(), json!(id));
    RetrievedPassage {
        id: id.into(),
        content: content.into(),
        similarity,
        metadata,
    }
}

struct Harness {
    embedder: Arc<FakeEmbedder>,
    store: Arc<FakeStore>,
    chat: Arc<FakeChat>,
    pipeline: RagPipeline,
}

fn harness(store: FakeStore, answer: &str) -> Harness {
    let embedder = Arc::new(FakeEmbedder {
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(store);
    let chat = Arc::new(FakeChat {
        answer: answer.into(),
        calls: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::new(
        embedder.clone(),
        store.clone(),
        chat.clone(),
        QueryDefaults::default(),
    );
    Harness {
        embedder,
        store,
        chat,
        pipeline,
    }
}

fn index_req(text: &str) -> IndexRequest {
    IndexRequest {
        course_id: "rust-101".into(),
        chapter_id: Some("ch-1".into()),
        content_type: "lesson".into(),
        text: text.into(),
        metadata: None,
    }
}

#[tokio::test]
async fn empty_retrieval_short_circuits_without_calling_the_model() {
    let h = harness(FakeStore::default(), "unused");

    let res = h
        .pipeline
        .query("What is a lifetime?", "rust-101", QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(res.answer, NO_CONTEXT_ANSWER);
    assert!(res.sources.is_empty());
    assert_eq!(res.confidence, 0.0);
    assert_eq!(res.tokens_used, 0);
    assert!(h.chat.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_degrades_to_fallback_answer() {
    let h = harness(
        FakeStore {
            fail_match: true,
            ..Default::default()
        },
        "unused",
    );
    let res = h
        .pipeline
        .query("q", "rust-101", QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(res.answer, NO_CONTEXT_ANSWER);
    assert_eq!(res.confidence, 0.0);
}

#[tokio::test]
async fn full_query_bundles_answer_sources_confidence_and_tokens() {
    let h = harness(
        FakeStore {
            passages: vec![
                passage("a", "Ownership moves values.", 0.9),
                passage("b", "Borrowing lends references.", 0.8),
            ],
            ..Default::default()
        },
        "I'm not sure, but ownership moves values.",
    );

    let res = h
        .pipeline
        .query(
            "What happens on assignment?",
            "rust-101",
            QueryOptions {
                model: Some("gpt-4o".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(res.confidence, 0.43);
    assert_eq!(res.tokens_used, 120);
    assert_eq!(res.sources.len(), 2);
    assert_eq!(res.sources[0].metadata.get("chapter"), Some(&json!("a")));

    let calls = h.chat.calls.lock().unwrap();
    let (system, user, model) = &calls[0];
    assert_eq!(system, SYSTEM_PROMPT);
    assert!(user.contains("Ownership moves values.\n\n---\n\nBorrowing lends references."));
    assert!(user.ends_with("Question: What happens on assignment?"));
    assert_eq!(model.as_deref(), Some("gpt-4o"));

    let q = &h.store.queries.lock().unwrap()[0];
    assert_eq!((q.course_id.as_str(), q.top_k, q.threshold), ("rust-101", 5, 0.7));
}

#[tokio::test]
async fn context_budget_limits_what_the_model_sees() {
    let long = "x".repeat(40); // 10 tokens
    let h = harness(
        FakeStore {
            passages: vec![passage("a", "short", 1.0), passage("b", &long, 0.8)],
            ..Default::default()
        },
        "Answer.",
    );
    let res = h
        .pipeline
        .query(
            "q",
            "c",
            QueryOptions {
                max_context_tokens: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let calls = h.chat.calls.lock().unwrap();
    assert!(!calls[0].1.contains(&long));
    // Sources still report everything retrieved.
    assert_eq!(res.sources.len(), 2);
    assert_eq!(res.confidence, 0.9);
}

#[tokio::test]
async fn invalid_inputs_are_rejected_before_any_call() {
    let h = harness(FakeStore::default(), "x");
    for (q, c, opts) in [
        ("  ", "c", QueryOptions::default()),
        ("q", "", QueryOptions::default()),
        (
            "q",
            "c",
            QueryOptions {
                similarity_threshold: Some(1.5),
                ..Default::default()
            },
        ),
        (
            "q",
            "c",
            QueryOptions {
                top_k: Some(0),
                ..Default::default()
            },
        ),
    ] {
        let err = h.pipeline.query(q, c, opts).await.unwrap_err();
        assert!(matches!(err, ContextorError::InvalidInput(_)), "{err}");
    }
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_returns_passages_without_synthesis() {
    let h = harness(
        FakeStore {
            passages: vec![passage("a", "A", 0.72), passage("low", "L", 0.5)],
            ..Default::default()
        },
        "x",
    );
    let hits = h
        .pipeline
        .search("q", "c", QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
    assert!(h.chat.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn index_persists_chunk_and_returns_store_id() {
    let h = harness(FakeStore::default(), "x");
    let mut req = index_req("Traits define behavior.");
    req.metadata = Some(json!({ "kind": "video" }).as_object().cloned().unwrap());

    let id = h.pipeline.index(req).await.unwrap();
    assert_eq!(id, "id-0");

    let inserted = h.store.inserted.lock().unwrap();
    assert_eq!(inserted[0].course_id, "rust-101");
    assert_eq!(inserted[0].chapter_id.as_deref(), Some("ch-1"));
    assert_eq!(inserted[0].embedding, vec![23.0, 1.0]);
    assert_eq!(inserted[0].metadata.get("kind"), Some(&json!("video")));
}

#[tokio::test]
async fn index_store_failure_is_fatal() {
    let h = harness(
        FakeStore {
            fail_insert_at: Some(0),
            ..Default::default()
        },
        "x",
    );
    let err = h.pipeline.index(index_req("text")).await.unwrap_err();
    assert!(matches!(
        err,
        ContextorError::IndexingFailed(RagError::Store { status: 409, .. })
    ));
}

#[tokio::test]
async fn index_many_keeps_order_and_reports_progress() {
    let h = harness(FakeStore::default(), "x");
    let pipeline = h.pipeline.clone().with_batch_options(rag_embed::BatchOptions {
        batch_size: 2,
        parallel: true,
    });

    let mut steps = Vec::new();
    let ids = pipeline
        .index_many(
            vec![index_req("a"), index_req("bb"), index_req("ccc")],
            |p| steps.push(p),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec!["id-0", "id-1", "id-2"]);
    assert_eq!(steps, vec![50, 100]);
    let contents: Vec<String> = h
        .store
        .inserted
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.content.clone())
        .collect();
    assert_eq!(contents, vec!["a", "bb", "ccc"]);
}

#[tokio::test]
async fn index_many_stops_at_first_store_failure() {
    let h = harness(
        FakeStore {
            fail_insert_at: Some(1),
            ..Default::default()
        },
        "x",
    );
    let err = h
        .pipeline
        .index_many(vec![index_req("a"), index_req("b"), index_req("c")], |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ContextorError::IndexingFailed(_)));
    assert_eq!(h.store.inserted.lock().unwrap().len(), 1);
}

#[test]
fn cost_estimate_uses_the_provider_price() {
    let h = harness(FakeStore::default(), "x");
    let want = EmbeddingProviderKind::OpenAI.cost_per_million_tokens() / 1_000_000.0;
    assert_eq!(h.pipeline.estimate_cost(&["aaaa"]), want);
}
