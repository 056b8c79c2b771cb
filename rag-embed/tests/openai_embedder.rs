use std::{sync::Arc, time::Duration};

use ai_llm_service::{LlmModelConfig, LlmProvider, OpenAiService};
use rag_embed::{
    BatchOptions, EmbedError, Embedder, EmbeddingProviderKind, EmbeddingsProvider, RetryPolicy,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(uri: &str) -> OpenAiService {
    OpenAiService::new(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: "text-embedding-3-small".into(),
        endpoint: uri.into(),
        api_key: Some("sk-test".into()),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(5),
    })
    .unwrap()
}

fn embedder(uri: &str) -> Embedder {
    Embedder::new(EmbeddingProviderKind::OpenAI, Arc::new(service(uri)))
        .unwrap()
        .with_dimensions(3)
        .with_retry(RetryPolicy::new(2, Duration::from_millis(1), false))
}

#[tokio::test]
async fn repeated_text_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "input": "what is ownership?", "dimensions": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "embedding": [0.5, 0.5, 0.0] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let e = embedder(&server.uri()).with_cache(8);
    let a = e.embed("what is ownership?").await.unwrap();
    let b = e.embed("what is ownership?").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, vec![0.5, 0.5, 0.0]);
}

#[tokio::test]
async fn server_errors_are_retried_then_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(2)
        .mount(&server)
        .await;

    let err = embedder(&server.uri()).embed("x").await.unwrap_err();
    assert!(matches!(err, EmbedError::Upstream(_)), "{err}");
}

#[tokio::test]
async fn batch_through_the_real_client_keeps_order() {
    let server = MockServer::start().await;
    for (text, v) in [("one", 1.0), ("two", 2.0), ("three", 3.0)] {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(json!({ "input": text })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [v, 0.0, 0.0] }]
            })))
            .mount(&server)
            .await;
    }

    let e = embedder(&server.uri());
    let mut steps = Vec::new();
    let out = e
        .embed_batch(
            &["one", "two", "three"],
            BatchOptions {
                batch_size: 2,
                parallel: true,
            },
            |p| steps.push(p),
        )
        .await
        .unwrap();

    let firsts: Vec<f32> = out.iter().map(|v| v[0]).collect();
    assert_eq!(firsts, vec![1.0, 2.0, 3.0]);
    assert_eq!(steps, vec![50, 100]);
}

#[tokio::test]
async fn configured_model_is_sent_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "model": "text-embedding-3-large" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "embedding": [0.0, 1.0, 0.0] }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(400).set_body_string("wrong model sent"))
        .with_priority(10)
        .mount(&server)
        .await;

    let e = embedder(&server.uri()).with_model("text-embedding-3-large");
    assert_eq!(e.model(), "text-embedding-3-large");
    let v = e.embed("what is a trait?").await.unwrap();
    assert_eq!(v, vec![0.0, 1.0, 0.0]);
}
