//! Shared utilities for use cases.
//!
//! Contains cancellation checking and the metered generation path used by
//! every caller of the generator (participants, moderator, side passes).

use crate::ports::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::resilience::{RateLimiter, RetryExecutor, ThrottleError};
use roundtable_domain::CapacityExceeded;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a single generation step failed. Never fatal to a session.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Throttle(#[from] ThrottleError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The response pushed the conversation over its token cap
    #[error(transparent)]
    Accounting(#[from] CapacityExceeded),
}

/// Check if cancellation has been requested.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Generator plus the resilience layer that guards it.
///
/// One instance is shared by every caller in a session so the rate limiter
/// applies backpressure globally, not per participant.
pub struct GenerationService<G: TextGenerator + 'static> {
    generator: Arc<G>,
    limiter: Arc<RateLimiter>,
    retry: RetryExecutor,
}

impl<G: TextGenerator + 'static> Clone for GenerationService<G> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            limiter: Arc::clone(&self.limiter),
            retry: self.retry.clone(),
        }
    }
}

impl<G: TextGenerator + 'static> GenerationService<G> {
    pub fn new(generator: Arc<G>, limiter: Arc<RateLimiter>, retry: RetryExecutor) -> Self {
        Self {
            generator,
            limiter,
            retry,
        }
    }

    /// Service with no rate limits and the default retry policy.
    pub fn unmetered(generator: Arc<G>) -> Self {
        Self::new(
            generator,
            Arc::new(RateLimiter::unlimited()),
            RetryExecutor::default(),
        )
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Generate with retries only.
    pub async fn generate(
        &self,
        label: &str,
        request: &GenerationRequest,
        progress: &dyn ConversationNotifier,
    ) -> Result<String, GenerationError> {
        self.retry
            .execute(label, progress, || self.generator.generate(request))
            .await
    }

    /// Throttle, generate with retries, then account for the response.
    pub async fn generate_metered(
        &self,
        label: &str,
        request: &GenerationRequest,
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> Result<String, TurnError> {
        let estimated = self.limiter.estimate_tokens(&request.estimation_text());
        self.limiter.throttle(estimated, cancel, progress).await?;

        let response = self.generate(label, request, progress).await?;

        self.limiter
            .account_additional_tokens(self.limiter.estimate_tokens(&response))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoConversationProgress;
    use crate::testing::MockGenerator;
    use roundtable_domain::RateLimitConfig;

    #[tokio::test]
    async fn test_metered_call_reserves_and_accounts() {
        let generator = Arc::new(MockGenerator::with_replies(["abcdefgh"]));
        let limiter = Arc::new(RateLimiter::new(Some(RateLimitConfig::default())));
        let service = GenerationService::new(generator, limiter, RetryExecutor::default());

        let request = GenerationRequest::new("s", "p");
        let reply = service
            .generate_metered("t", &request, None, &NoConversationProgress)
            .await
            .unwrap();

        assert_eq!(reply, "abcdefgh");
        let usage = service.limiter().usage();
        assert_eq!(usage.conversation_requests, 1);
        // "s\n\np" is 4 chars -> 1 token, response 8 chars -> 2 tokens
        assert_eq!(usage.conversation_tokens, 3);
    }

    #[tokio::test]
    async fn test_accounting_cap_fails_the_call() {
        let generator = Arc::new(MockGenerator::with_replies(["x".repeat(400)]));
        let limiter = Arc::new(RateLimiter::new(Some(RateLimitConfig {
            max_tokens_per_conversation: Some(50),
            ..Default::default()
        })));
        let service = GenerationService::new(generator, limiter, RetryExecutor::default());

        let err = service
            .generate_metered(
                "t",
                &GenerationRequest::new("s", "p"),
                None,
                &NoConversationProgress,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TurnError::Accounting(CapacityExceeded::ConversationTokens { limit: 50 })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_generation() {
        let generator = Arc::new(MockGenerator::with_replies(["never"]));
        let limiter = Arc::new(RateLimiter::new(Some(RateLimitConfig::default())));
        let service = GenerationService::new(generator.clone(), limiter, RetryExecutor::default());
        let token = CancellationToken::new();
        token.cancel();

        let err = service
            .generate_metered(
                "t",
                &GenerationRequest::new("s", "p"),
                Some(&token),
                &NoConversationProgress,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Throttle(ThrottleError::Cancelled)));
        assert!(generator.requests().is_empty());
    }
}
