//! Hand-written backends and a recording sleeper shared by the agent tests.

#![allow(dead_code)]

use async_trait::async_trait;
use herald_agent::{
    ContentConfig, ContentPolicy, Finisher, Generator, OverflowPolicy, RetryPolicy,
    SleepOutcome, Sleeper,
};
use herald_core::{
    AccountPost, CompletionRequest, FinishedPost, GeneratedText, PostId, PublishReceipt,
};
use herald_error::{CompletionError, SocialError, SocialErrorKind};
use herald_interface::{AccountReader, CompletionBackend, PublishBackend};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const LIVELY: &str = "Buying the top again because the chart looked lonely 😅 classic move";

/// What a scripted backend does once its script runs out.
#[derive(Clone)]
pub enum Fallback {
    Text(String),
    RateLimited,
    Quota,
    Fatal,
    Hang,
}

/// Completion backend that replays a script, then repeats a fallback.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    fallback: Fallback,
    calls: AtomicU32,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, CompletionError>>, fallback: Fallback) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(fallback: Fallback) -> Arc<Self> {
        Self::new(Vec::new(), fallback)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, req: &CompletionRequest) -> Result<GeneratedText, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req.clone());
        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(result) => result,
            None => match &self.fallback {
                Fallback::Text(text) => Ok(text.clone()),
                Fallback::RateLimited => Err(CompletionError::rate_limited(None)),
                Fallback::Quota => Err(CompletionError::quota_exceeded()),
                Fallback::Fatal => Err(CompletionError::other("invalid api key")),
                Fallback::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            },
        };
        result.map(GeneratedText::new)
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Records every requested wait and returns immediately.
///
/// When `cancel_after` is set, the token is cancelled on that many-th sleep and the
/// sleep reports cancellation.
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sleeps: Mutex::new(Vec::new()),
            cancel_after: None,
        })
    }

    pub fn cancelling_after(n: usize, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            sleeps: Mutex::new(Vec::new()),
            cancel_after: Some((n, token)),
        })
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) -> SleepOutcome {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len()
        };
        match &self.cancel_after {
            Some((n, token)) if count >= *n => {
                token.cancel();
                SleepOutcome::Cancelled
            }
            _ => SleepOutcome::Elapsed,
        }
    }
}

/// Publisher that records posts and can be told to fail.
pub struct RecordingPublisher {
    posts: Mutex<Vec<(String, Option<PostId>)>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn posts(&self) -> Vec<(String, Option<PostId>)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishBackend for RecordingPublisher {
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        self.posts
            .lock()
            .unwrap()
            .push((post.as_str().to_string(), reply_to.cloned()));
        if self.fail {
            return Err(SocialError::new(SocialErrorKind::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            }));
        }
        Ok(PublishReceipt {
            id: Some(PostId(format!("p{}", self.posts.lock().unwrap().len()))),
            platform: "recording".to_string(),
        })
    }

    fn platform_name(&self) -> &str {
        "recording"
    }

    fn max_post_length(&self) -> usize {
        280
    }
}

/// Account reader returning fixed posts, or failing.
pub struct StaticReader {
    posts: Vec<AccountPost>,
    fail: bool,
    reads: AtomicU32,
}

impl StaticReader {
    pub fn new(posts: Vec<AccountPost>) -> Arc<Self> {
        Arc::new(Self {
            posts,
            fail: false,
            reads: AtomicU32::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            posts: Vec::new(),
            fail: true,
            reads: AtomicU32::new(0),
        })
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountReader for StaticReader {
    async fn recent_posts(
        &self,
        _account: &str,
        limit: usize,
    ) -> Result<Vec<AccountPost>, SocialError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SocialError::new(SocialErrorKind::Transport(
                "connection reset".to_string(),
            )));
        }
        Ok(self.posts.iter().take(limit).cloned().collect())
    }
}

/// Generator over `backend` with a 60 s base and no real waiting.
pub fn generator(
    backend: Arc<ScriptedBackend>,
    sleeper: Arc<RecordingSleeper>,
    max_retries: u32,
    overflow: OverflowPolicy,
) -> Generator {
    let policy = ContentPolicy::new(&ContentConfig::default()).unwrap();
    Generator::new(
        backend,
        policy,
        Finisher::new(280, overflow),
        RetryPolicy::new(max_retries, Duration::from_secs(60)),
        Duration::from_secs(60),
        sleeper,
    )
}
