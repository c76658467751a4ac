//! Prompt, call, finish; retried on transient backend failures.

use crate::{AccountInsight, ContentPolicy, Finisher, RetryPolicy, Sleeper};
use herald_core::FinishedPost;
use herald_error::{CompletionError, GenerationError, GenerationErrorKind, RetryableError};
use herald_interface::CompletionBackend;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Produces one finished post per call, or a classified failure.
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn CompletionBackend>,
    policy: ContentPolicy,
    finisher: Finisher,
    retry: RetryPolicy,
    call_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.backend.provider_name())
            .field("model", &self.backend.model_name())
            .field("policy", &self.policy)
            .field("finisher", &self.finisher)
            .field("retry", &self.retry)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl Generator {
    /// Assemble a generator.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        policy: ContentPolicy,
        finisher: Finisher,
        retry: RetryPolicy,
        call_timeout: Duration,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            backend,
            policy,
            finisher,
            retry,
            call_timeout,
            sleeper,
        }
    }

    /// Retry policy in use.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Generate a post.
    ///
    /// Each attempt draws a fresh content type and tag set. Rate-limit and quota
    /// failures back off geometrically; any other backend failure ends the call.
    /// Text that cannot be finished within the limit consumes the attempt without
    /// a backoff wait.
    ///
    /// # Errors
    ///
    /// - `Backend` on the first fatal backend failure (including a call timeout)
    /// - `Exhausted` when every attempt was spent
    /// - `Cancelled` when shutdown interrupted a backoff wait
    #[instrument(skip_all, fields(provider = self.backend.provider_name(), max_retries = self.retry.max_retries()))]
    pub async fn generate(
        &self,
        rng: &mut StdRng,
        context: Option<&AccountInsight>,
    ) -> Result<FinishedPost, GenerationError> {
        for attempt in 0..self.retry.max_retries() {
            let content_type = self.policy.select_type(rng);
            let prompt = self.policy.build_prompt_with(content_type, context);
            let tags = self.policy.sample_tags(rng);

            debug!(attempt, content_type = %content_type, "Requesting completion");
            match self.call(&prompt.to_request()).await {
                Ok(text) => match self.finisher.finish(text.as_str(), &tags) {
                    Some(post) => {
                        info!(attempt, content_type = %content_type, chars = post.char_count(), "Generated post");
                        return Ok(post);
                    }
                    None => {
                        warn!(
                            attempt,
                            limit = self.finisher.limit(),
                            "Generated text does not fit the limit, resampling"
                        );
                    }
                },
                Err(e) if e.is_transient() => {
                    if !self.retry.has_next(attempt) {
                        warn!(attempt, error = %e.kind, "Transient failure on final attempt");
                        continue;
                    }
                    let hinted = e.retry_after_secs().map(Duration::from_secs);
                    let delay = self
                        .retry
                        .delay_for(attempt)
                        .max(hinted.unwrap_or_default());
                    warn!(
                        attempt = attempt + 1,
                        of = self.retry.max_retries(),
                        delay_secs = delay.as_secs(),
                        error = %e.kind,
                        "Backend throttled, backing off"
                    );
                    if self.sleeper.sleep(delay).await.is_cancelled() {
                        return Err(GenerationError::new(GenerationErrorKind::Cancelled));
                    }
                }
                Err(e) => {
                    error!(attempt, error = %e, "Fatal backend failure");
                    return Err(e.into());
                }
            }
        }

        error!(attempts = self.retry.max_retries(), "Generation attempts exhausted");
        Err(GenerationError::exhausted(self.retry.max_retries()))
    }

    async fn call(
        &self,
        request: &herald_core::CompletionRequest,
    ) -> Result<herald_core::GeneratedText, CompletionError> {
        match tokio::time::timeout(self.call_timeout, self.backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::other(format!(
                "Backend call timed out after {}s",
                self.call_timeout.as_secs()
            ))),
        }
    }
}
