//! OpenAI-compatible chat-completions client.
//!
//! Works against OpenAI itself and any provider exposing the same
//! `/chat/completions` contract (Groq, OpenRouter, local vLLM servers).

mod dto;

use dto::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope};
use herald_core::{CompletionRequest, GeneratedText};
use herald_error::{CompletionError, HttpError};
use herald_interface::CompletionBackend;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// OpenAI chat-completions endpoint.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const QUOTA_CODE: &str = "insufficient_quota";

/// Chat-completions client for OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    provider: &'static str,
}

impl OpenAiCompatibleClient {
    /// Creates a client for an arbitrary OpenAI-compatible endpoint.
    ///
    /// `timeout` bounds every request end to end; a hung backend can never hold
    /// the loop longer than this.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    #[instrument(skip(api_key), fields(model = %model.as_ref(), endpoint = %endpoint.as_ref()))]
    pub fn new(
        api_key: impl Into<String>,
        model: impl AsRef<str>,
        endpoint: impl AsRef<str>,
        provider: &'static str,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!("Creating OpenAI-compatible client");
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.as_ref().to_string(),
            endpoint: endpoint.as_ref().to_string(),
            provider,
        })
    }

    /// Creates a client for the OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn openai(
        api_key: impl Into<String>,
        model: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        Self::new(api_key, model, OPENAI_CHAT_URL, "openai", timeout)
    }

    /// Endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Maps a failed HTTP exchange onto the transient/fatal classification.
fn classify_failure(status: StatusCode, retry_after: Option<u64>, body: &str) -> CompletionError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let is_quota = parsed.as_ref().is_some_and(|envelope| {
        envelope.error.code.as_deref() == Some(QUOTA_CODE)
            || envelope.error.kind.as_deref() == Some(QUOTA_CODE)
    });
    if is_quota {
        return CompletionError::quota_exceeded();
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return CompletionError::rate_limited(retry_after);
    }

    let message = parsed
        .map(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    CompletionError::other(format!("HTTP {}: {}", status.as_u16(), message))
}

#[async_trait::async_trait]
impl CompletionBackend for OpenAiCompatibleClient {
    #[instrument(skip(self, req), fields(provider = self.provider, model = %self.model))]
    async fn complete(&self, req: &CompletionRequest) -> Result<GeneratedText, CompletionError> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let body = ChatRequest {
            model,
            messages: req
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        debug!(messages = body.messages.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send chat completion request");
                if e.is_timeout() {
                    CompletionError::other("Request timed out")
                } else {
                    CompletionError::other(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status, retry_after, &body);
            if err.is_transient() {
                warn!(status = %status, kind = %err.kind, "Completion backend throttled");
            } else {
                error!(status = %status, body = %body, "Completion backend returned error");
            }
            return Err(err);
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse chat completion response");
            CompletionError::other(format!("Failed to parse response: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| CompletionError::other("Response contained no text"))?;

        debug!(chars = text.chars().count(), "Received completion");
        Ok(GeneratedText::new(text))
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
