//! Query and indexing orchestration.

use std::{sync::Arc, time::Instant};

use ai_llm_service::{OpenAiService, config::default_config::config_openai_chat};
use rag_embed::{
    BatchOptions, Embedder, EmbeddingConfig, EmbeddingProviderKind, EmbeddingsProvider, run_batches,
};
use rag_store::{ContextRetriever, NewChunk, RetrievedPassage, StoreConfig, VectorStore, connect};
use tracing::{debug, info};

use crate::{
    api_types::{IndexRequest, QueryOptions, RagResult},
    budget::build_context,
    cfg::{QueryDefaults, validate_knobs},
    confidence::score_confidence,
    error::ContextorError,
    synthesize::{AnswerSynthesizer, ChatModel},
};

/// Answer returned when retrieval finds nothing usable.
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find relevant information in the course materials to answer this question.";

/// Embedding → retrieval → budgeting → synthesis → confidence.
///
/// All collaborators are injected, so tests can swap in fakes.
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingsProvider>,
    retriever: ContextRetriever,
    synthesizer: AnswerSynthesizer,
    defaults: QueryDefaults,
    batch: BatchOptions,
}

/// Effective knobs of one query.
struct Resolved {
    top_k: usize,
    threshold: f64,
    max_context_tokens: usize,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        store: Arc<dyn VectorStore>,
        chat: Arc<dyn ChatModel>,
        defaults: QueryDefaults,
    ) -> Self {
        Self {
            embedder,
            retriever: ContextRetriever::new(store),
            synthesizer: AnswerSynthesizer::new(chat),
            defaults,
            batch: BatchOptions::default(),
        }
    }

    pub fn with_batch_options(mut self, batch: BatchOptions) -> Self {
        self.batch = batch;
        self
    }

    /// Wires the OpenAI embedder and chat client, the configured store and
    /// the query defaults from environment variables.
    pub fn from_env() -> Result<Self, ContextorError> {
        let emb_cfg = EmbeddingConfig::from_env()?;
        let embedder = Embedder::from_config(&emb_cfg)?;
        let store_cfg = StoreConfig::from_env().map_err(|e| ContextorError::Config(e.to_string()))?;
        let store = connect(&store_cfg).map_err(|e| ContextorError::Config(e.to_string()))?;
        let chat = config_openai_chat()
            .and_then(OpenAiService::new)
            .map_err(|e| ContextorError::Config(e.to_string()))?;
        let defaults = QueryDefaults::from_env()?;

        info!(
            store = store.name(),
            embedding_model = %embedder.model(),
            top_k = defaults.top_k,
            threshold = defaults.similarity_threshold,
            "RAG pipeline configured"
        );

        Ok(Self::new(Arc::new(embedder), store, Arc::new(chat), defaults)
            .with_batch_options(emb_cfg.batch))
    }

    pub fn defaults(&self) -> QueryDefaults {
        self.defaults
    }

    pub fn store_name(&self) -> &'static str {
        self.retriever.store().name()
    }

    pub fn embedding_provider(&self) -> EmbeddingProviderKind {
        self.embedder.kind()
    }

    fn resolve(
        &self,
        question: &str,
        course_id: &str,
        opts: &QueryOptions,
    ) -> Result<Resolved, ContextorError> {
        if question.trim().is_empty() {
            return Err(ContextorError::InvalidInput("question is empty".into()));
        }
        if course_id.trim().is_empty() {
            return Err(ContextorError::InvalidInput("course_id is empty".into()));
        }
        let r = Resolved {
            top_k: opts.top_k.unwrap_or(self.defaults.top_k),
            threshold: opts
                .similarity_threshold
                .unwrap_or(self.defaults.similarity_threshold),
            max_context_tokens: opts
                .max_context_tokens
                .unwrap_or(self.defaults.max_context_tokens),
        };
        validate_knobs(r.top_k, r.threshold).map_err(ContextorError::InvalidInput)?;
        Ok(r)
    }

    async fn retrieve(
        &self,
        question: &str,
        course_id: &str,
        knobs: &Resolved,
        opts: &QueryOptions,
    ) -> Result<Vec<RetrievedPassage>, ContextorError> {
        let embedding = self.embedder.embed(question).await?;
        Ok(self
            .retriever
            .retrieve(
                &embedding,
                course_id,
                knobs.top_k,
                knobs.threshold,
                opts.filter.clone(),
            )
            .await)
    }

    /// Answers `question` from the content indexed for `course_id`.
    ///
    /// An empty retrieval short-circuits to [`NO_CONTEXT_ANSWER`] with no
    /// sources, zero confidence and zero tokens; the model is not called.
    ///
    /// # Errors
    /// `InvalidInput`, `Embedding` or `Generation`. Store failures during
    /// retrieval are not errors.
    pub async fn query(
        &self,
        question: &str,
        course_id: &str,
        opts: QueryOptions,
    ) -> Result<RagResult, ContextorError> {
        let started = Instant::now();
        let knobs = self.resolve(question, course_id, &opts)?;

        let passages = self.retrieve(question, course_id, &knobs, &opts).await?;
        if passages.is_empty() {
            info!(%course_id, "no passages above threshold; returning fallback answer");
            return Ok(RagResult {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                tokens_used: 0,
            });
        }

        let context = build_context(&passages, knobs.max_context_tokens);
        debug!(
            passages = passages.len(),
            context_chars = context.len(),
            "context assembled"
        );

        let synthesis = self
            .synthesizer
            .synthesize(question, &context, opts.model.as_deref())
            .await?;
        let confidence = score_confidence(&passages, &synthesis.answer);

        info!(
            %course_id,
            sources = passages.len(),
            confidence,
            tokens_used = synthesis.tokens_used,
            latency_ms = started.elapsed().as_millis(),
            "query completed"
        );

        Ok(RagResult {
            answer: synthesis.answer,
            sources: passages,
            confidence,
            tokens_used: synthesis.tokens_used,
        })
    }

    /// Ranked passages for `question` without calling the generative model.
    pub async fn search(
        &self,
        question: &str,
        course_id: &str,
        opts: QueryOptions,
    ) -> Result<Vec<RetrievedPassage>, ContextorError> {
        let knobs = self.resolve(question, course_id, &opts)?;
        self.retrieve(question, course_id, &knobs, &opts).await
    }

    /// Embeds and stores one chunk, returning the id assigned by the store.
    ///
    /// # Errors
    /// `InvalidInput`, `Embedding`, or `IndexingFailed` carrying the store error.
    pub async fn index(&self, req: IndexRequest) -> Result<String, ContextorError> {
        validate_index_request(&req)?;
        let started = Instant::now();
        let embedding = self.embedder.embed(&req.text).await?;
        let id = self.store_chunk(req, embedding).await?;
        info!(%id, latency_ms = started.elapsed().as_millis(), "chunk indexed");
        Ok(id)
    }

    /// Indexes many chunks: batch embedding first, then one insert per chunk
    /// in input order. `on_progress` follows the embedding batches.
    ///
    /// The first store failure aborts the run.
    pub async fn index_many<P>(
        &self,
        reqs: Vec<IndexRequest>,
        on_progress: P,
    ) -> Result<Vec<String>, ContextorError>
    where
        P: FnMut(u32) + Send,
    {
        for r in &reqs {
            validate_index_request(r)?;
        }
        let started = Instant::now();
        let texts: Vec<&str> = reqs.iter().map(|r| r.text.as_str()).collect();
        let embeddings =
            run_batches(self.embedder.as_ref(), &texts, self.batch, on_progress).await?;
        drop(texts);

        let mut ids = Vec::with_capacity(reqs.len());
        for (req, embedding) in reqs.into_iter().zip(embeddings) {
            ids.push(self.store_chunk(req, embedding).await?);
        }

        info!(
            chunks = ids.len(),
            latency_ms = started.elapsed().as_millis(),
            "bulk indexing completed"
        );
        Ok(ids)
    }

    /// Heuristic USD cost of embedding `texts` with the configured provider.
    pub fn estimate_cost<S: AsRef<str>>(&self, texts: &[S]) -> f64 {
        self.embedder.kind().estimate_cost(texts)
    }

    async fn store_chunk(
        &self,
        req: IndexRequest,
        embedding: Vec<f32>,
    ) -> Result<String, ContextorError> {
        let chunk = NewChunk {
            course_id: req.course_id,
            chapter_id: req.chapter_id,
            content_type: req.content_type,
            content: req.text,
            embedding,
            metadata: req.metadata.unwrap_or_default(),
        };
        self.retriever
            .store()
            .insert_chunk(&chunk)
            .await
            .map_err(ContextorError::IndexingFailed)
    }
}

fn validate_index_request(req: &IndexRequest) -> Result<(), ContextorError> {
    if req.course_id.trim().is_empty() {
        return Err(ContextorError::InvalidInput("course_id is empty".into()));
    }
    if req.content_type.trim().is_empty() {
        return Err(ContextorError::InvalidInput("content_type is empty".into()));
    }
    if req.text.trim().is_empty() {
        return Err(ContextorError::InvalidInput("text is empty".into()));
    }
    Ok(())
}
