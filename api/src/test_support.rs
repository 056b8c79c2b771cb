//! In-memory collaborators for handler tests.

use std::sync::{Arc, Mutex};

use ai_llm_service::{AiLlmError, ChatCompletion, TokenUsage};
use contextor::{ChatModel, QueryDefaults, RagPipeline};
use futures::future::BoxFuture;
use rag_embed::{EmbedError, EmbeddingProviderKind, EmbeddingsProvider};
use rag_store::{MatchQuery, NewChunk, RagError, RetrievedPassage, VectorStore};
use serde_json::Map;

use crate::core::app_state::AppState;

struct TestEmbedder;

impl EmbeddingsProvider for TestEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbedError>> {
        let v = vec![text.len() as f32, 1.0];
        Box::pin(async move { Ok(v) })
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model(&self) -> &str {
        "test"
    }

    fn kind(&self) -> EmbeddingProviderKind {
        EmbeddingProviderKind::OpenAI
    }
}

#[derive(Default)]
pub struct TestStore {
    pub passages: Vec<RetrievedPassage>,
    pub fail_insert: bool,
    pub inserted: Mutex<Vec<NewChunk>>,
}

impl TestStore {
    pub fn with_passages(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            ..Default::default()
        }
    }
}

impl VectorStore for TestStore {
    fn match_embeddings<'a>(
        &'a self,
        _query: &'a MatchQuery,
    ) -> BoxFuture<'a, Result<Vec<RetrievedPassage>, RagError>> {
        let out = self.passages.clone();
        Box::pin(async move { Ok(out) })
    }

    fn insert_chunk<'a>(&'a self, chunk: &'a NewChunk) -> BoxFuture<'a, Result<String, RagError>> {
        let out = if self.fail_insert {
            Err(RagError::Store {
                status: 500,
                snippet: "insert failed".into(),
            })
        } else {
            match self.inserted.lock() {
                Ok(mut inserted) => {
                    inserted.push(chunk.clone());
                    Ok(format!("id-{}", inserted.len() - 1))
                }
                Err(_) => Err(RagError::Config("poisoned".into())),
            }
        };
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "test"
    }
}

struct TestChat {
    answer: String,
}

impl ChatModel for TestChat {
    fn chat<'a>(
        &'a self,
        _system: &'a str,
        _user: &'a str,
        _model: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>> {
        let out = ChatCompletion {
            content: self.answer.clone(),
            usage: TokenUsage {
                prompt_tokens: 30,
                completion_tokens: 12,
                total_tokens: 42,
            },
        };
        Box::pin(async move { Ok(out) })
    }
}

pub fn passage(id: &str, content: &str, similarity: f64) -> RetrievedPassage {
    RetrievedPassage {
        id: id.into(),
        content: content.into(),
        similarity,
        metadata: Map::new(),
    }
}

pub fn state_with(store: TestStore, answer: &str) -> Arc<AppState> {
    let pipeline = RagPipeline::new(
        Arc::new(TestEmbedder),
        Arc::new(store),
        Arc::new(TestChat {
            answer: answer.into(),
        }),
        QueryDefaults::default(),
    );
    Arc::new(AppState::new(pipeline))
}
