//! Trait definitions for completion and social backends.

use async_trait::async_trait;
use herald_core::{AccountPost, CompletionRequest, FinishedPost, GeneratedText, PostId, PublishReceipt};
use herald_error::{CompletionError, SocialError};
use std::sync::Arc;

/// Core trait that all text-generation backends must implement.
///
/// Implementations classify their failures: rate-limit and quota signals become
/// transient [`CompletionError`]s, everything else is fatal.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate text for a prompt.
    async fn complete(&self, req: &CompletionRequest) -> Result<GeneratedText, CompletionError>;

    /// Provider name (e.g., "openai", "groq").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gpt-4o-mini").
    fn model_name(&self) -> &str;
}

/// Trait for social platforms that accept finished posts.
#[async_trait]
pub trait PublishBackend: Send + Sync {
    /// Publish a post, optionally as a reply to an existing post.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Authentication fails
    /// - The platform rejects the content
    /// - Rate limit exceeded
    /// - Transport failure
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError>;

    /// Platform name (e.g., "x", "discord").
    fn platform_name(&self) -> &str;

    /// Hard post length limit in characters.
    fn max_post_length(&self) -> usize;
}

/// Trait for platforms that can list another account's recent posts.
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Most recent posts of `account`, newest first, at most `limit` items.
    async fn recent_posts(
        &self,
        account: &str,
        limit: usize,
    ) -> Result<Vec<AccountPost>, SocialError>;
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    async fn complete(&self, req: &CompletionRequest) -> Result<GeneratedText, CompletionError> {
        (**self).complete(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: PublishBackend + ?Sized> PublishBackend for Arc<T> {
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        (**self).publish(post, reply_to).await
    }

    fn platform_name(&self) -> &str {
        (**self).platform_name()
    }

    fn max_post_length(&self) -> usize {
        (**self).max_post_length()
    }
}

#[async_trait]
impl<T: AccountReader + ?Sized> AccountReader for Arc<T> {
    async fn recent_posts(
        &self,
        account: &str,
        limit: usize,
    ) -> Result<Vec<AccountPost>, SocialError> {
        (**self).recent_posts(account, limit).await
    }
}
