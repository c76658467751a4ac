//! Discord, dry-run and retry wrapper behavior.

use async_trait::async_trait;
use herald_core::{FinishedPost, PostId, PublishReceipt};
use herald_error::{SocialError, SocialErrorKind};
use herald_interface::PublishBackend;
use herald_social::{DiscordWebhookPublisher, LogPublisher, PublishRetryConfig, RetryingPublisher};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_discord_webhook_waits_for_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(query_param("wait", "true"))
        .and(body_json(json!({"content": "BTC at 64K 🚀"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "555", "content": "BTC at 64K 🚀"})))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = DiscordWebhookPublisher::new(
        format!("{}/api/webhooks/1/abc", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let post = FinishedPost::within("BTC at 64K 🚀", publisher.max_post_length()).unwrap();
    let receipt = publisher.publish(&post, None).await.unwrap();

    assert_eq!(receipt.id, Some(PostId("555".to_string())));
    assert_eq!(receipt.platform, "discord");
}

#[tokio::test]
async fn test_discord_server_error_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream"))
        .mount(&server)
        .await;

    let publisher = DiscordWebhookPublisher::new(server.uri(), Duration::from_secs(5)).unwrap();
    let post = FinishedPost::within("hello", 2000).unwrap();
    let err = publisher.publish(&post, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        SocialErrorKind::Rejected {
            status: 503,
            message: "upstream".to_string()
        }
    );
}

#[tokio::test]
async fn test_log_publisher_counts_and_synthesizes_ids() {
    let publisher = LogPublisher::new(280);
    let post = FinishedPost::within("dry run", 280).unwrap();

    let first = publisher.publish(&post, None).await.unwrap();
    let second = publisher.publish(&post, first.id.as_ref()).await.unwrap();

    assert_eq!(first.id, Some(PostId("dry-run-1".to_string())));
    assert_eq!(second.id, Some(PostId("dry-run-2".to_string())));
    assert_eq!(publisher.published(), 2);
    assert_eq!(publisher.platform_name(), "log");
}

/// Fails with scripted errors, then succeeds.
struct FlakyPlatform {
    failures: Mutex<Vec<SocialErrorKind>>,
    calls: Mutex<u32>,
}

impl FlakyPlatform {
    fn new(mut failures: Vec<SocialErrorKind>) -> Self {
        failures.reverse();
        Self {
            failures: Mutex::new(failures),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PublishBackend for FlakyPlatform {
    async fn publish(
        &self,
        _post: &FinishedPost,
        _reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.failures.lock().unwrap().pop();
        match next {
            Some(kind) => Err(SocialError::new(kind)),
            None => Ok(PublishReceipt {
                id: Some(PostId("ok".to_string())),
                platform: "flaky".to_string(),
            }),
        }
    }

    fn platform_name(&self) -> &str {
        "flaky"
    }

    fn max_post_length(&self) -> usize {
        280
    }
}

fn fast_retries(max_retries: usize) -> PublishRetryConfig {
    PublishRetryConfig {
        max_retries,
        interval: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_retrying_publisher_recovers_from_transient_failures() {
    let flaky = FlakyPlatform::new(vec![
        SocialErrorKind::Transport("reset".to_string()),
        SocialErrorKind::Rejected {
            status: 502,
            message: "bad gateway".to_string(),
        },
    ]);
    let publisher = RetryingPublisher::new(flaky, fast_retries(2));
    let post = FinishedPost::within("persist", 280).unwrap();

    let receipt = publisher.publish(&post, None).await.unwrap();
    assert_eq!(receipt.platform, "flaky");
    assert_eq!(publisher.inner().calls(), 3);
}

#[tokio::test]
async fn test_retrying_publisher_gives_up_after_budget() {
    let flaky = FlakyPlatform::new(vec![
        SocialErrorKind::Transport("a".to_string()),
        SocialErrorKind::Transport("b".to_string()),
        SocialErrorKind::Transport("c".to_string()),
        SocialErrorKind::Transport("d".to_string()),
    ]);
    let publisher = RetryingPublisher::new(flaky, fast_retries(2));
    let post = FinishedPost::within("persist", 280).unwrap();

    let err = publisher.publish(&post, None).await.unwrap_err();
    assert!(matches!(err.kind, SocialErrorKind::Transport(_)));
    assert_eq!(publisher.inner().calls(), 3);
}

#[tokio::test]
async fn test_retrying_publisher_does_not_retry_permanent_errors() {
    let flaky = FlakyPlatform::new(vec![SocialErrorKind::Unauthorized("bad token".to_string())]);
    let publisher = RetryingPublisher::new(flaky, fast_retries(2));
    let post = FinishedPost::within("persist", 280).unwrap();

    let err = publisher.publish(&post, None).await.unwrap_err();
    assert!(matches!(err.kind, SocialErrorKind::Unauthorized(_)));
    assert_eq!(publisher.inner().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_retry_after_wait() {
    let flaky = FlakyPlatform::new(vec![
        SocialErrorKind::RateLimited {
            retry_after_secs: Some(900),
        },
        SocialErrorKind::RateLimited {
            retry_after_secs: Some(900),
        },
    ]);
    let token = CancellationToken::new();
    let publisher = RetryingPublisher::new(
        flaky,
        PublishRetryConfig {
            max_retries: 2,
            interval: Duration::from_secs(30),
        },
    )
    .with_shutdown(token.clone());
    let post = FinishedPost::within("persist", 280).unwrap();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = publisher.publish(&post, None).await.unwrap_err();

    assert_eq!(err.kind, SocialErrorKind::Cancelled);
    assert_eq!(publisher.inner().calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[tokio::test]
async fn test_cancelled_token_skips_publishing() {
    let token = CancellationToken::new();
    token.cancel();
    let publisher =
        RetryingPublisher::new(FlakyPlatform::new(Vec::new()), fast_retries(2)).with_shutdown(token);
    let post = FinishedPost::within("persist", 280).unwrap();

    let err = publisher.publish(&post, None).await.unwrap_err();
    assert_eq!(err.kind, SocialErrorKind::Cancelled);
    assert_eq!(publisher.inner().calls(), 0);
}
