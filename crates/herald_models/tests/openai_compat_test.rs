//! HTTP-level tests for the OpenAI-compatible client.

use herald_core::PromptBundle;
use herald_error::CompletionErrorKind;
use herald_interface::CompletionBackend;
use herald_models::OpenAiCompatibleClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer, timeout: Duration) -> OpenAiCompatibleClient {
    OpenAiCompatibleClient::new(
        "test-key",
        "test-model",
        format!("{}/v1/chat/completions", server.uri()),
        "test",
        timeout,
    )
    .unwrap()
}

fn request() -> herald_core::CompletionRequest {
    PromptBundle::new("You are terse.", "Say something.", 100, 0.9).to_request()
}

#[tokio::test]
async fn test_successful_completion_returns_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  BTC up 5%! 🚀  "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    let text = client.complete(&request()).await.unwrap();

    assert_eq!(text.as_str(), "BTC up 5%! 🚀");
    assert_eq!(client.provider_name(), "test");
    assert_eq!(client.model_name(), "test-model");
}

#[tokio::test]
async fn test_request_body_carries_messages_and_sampling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(wiremock::matchers::body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 100,
            "messages": [
                {"role": "system", "content": "You are terse."},
                {"role": "user", "content": "Say something."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    assert_eq!(client.complete(&request()).await.unwrap().as_str(), "ok");
}

#[tokio::test]
async fn test_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "17")
                .set_body_json(json!({
                    "error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}
                })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    let err = client.complete(&request()).await.unwrap_err();

    assert_eq!(
        err.kind,
        CompletionErrorKind::RateLimited {
            retry_after_secs: Some(17)
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_insufficient_quota_is_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "You exceeded your current quota",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    let err = client.complete(&request()).await.unwrap_err();

    assert_eq!(err.kind, CompletionErrorKind::QuotaExceeded);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_auth_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    let err = client.complete(&request()).await.unwrap_err();

    assert!(!err.is_transient());
    match err.kind {
        CompletionErrorKind::Other(message) => assert!(message.contains("Incorrect API key")),
        other => panic!("expected Other, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5)).await;
    let err = client.complete(&request()).await.unwrap_err();
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_slow_backend_times_out_as_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(50)).await;
    let err = client.complete(&request()).await.unwrap_err();
    assert!(!err.is_transient());
}
