//! Async rate limiter shared by every caller in a session.
//!
//! Wraps the domain [`RateBudget`] in a mutex and turns
//! [`Reservation::WouldBlock`] into a cancellable sleep. The lock is only
//! held for the reservation arithmetic, never across an await.

use crate::ports::progress::ConversationNotifier;
use roundtable_domain::{
    CapacityExceeded, RateBudget, RateLimitConfig, RateUsage, Reservation, estimate_tokens,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Why [`RateLimiter::throttle`] gave up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("Throttle wait cancelled")]
    Cancelled,

    #[error(transparent)]
    Capacity(#[from] CapacityExceeded),
}

/// Per-minute windows plus per-conversation caps.
///
/// Without a config every call passes straight through.
pub struct RateLimiter {
    config: Option<RateLimitConfig>,
    budget: Mutex<RateBudget>,
}

impl RateLimiter {
    pub fn new(config: Option<RateLimitConfig>) -> Self {
        Self {
            config,
            budget: Mutex::new(RateBudget::new(now())),
        }
    }

    /// A limiter that never waits and never fails.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn config(&self) -> Option<&RateLimitConfig> {
        self.config.as_ref()
    }

    fn lock(&self) -> MutexGuard<'_, RateBudget> {
        self.budget.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Estimate tokens with the configured chars-per-token ratio.
    pub fn estimate_tokens(&self, text: &str) -> u64 {
        let ratio = self
            .config
            .as_ref()
            .map(|c| c.approx_chars_per_token)
            .unwrap_or_else(|| RateLimitConfig::default().approx_chars_per_token);
        estimate_tokens(text, ratio)
    }

    /// Wait until one request of `estimated_tokens` fits, then reserve it.
    ///
    /// Per-conversation caps and oversized requests fail immediately.
    /// `cancel` is checked before every reservation attempt and raced
    /// against every sleep.
    pub async fn throttle(
        &self,
        estimated_tokens: u64,
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> Result<(), ThrottleError> {
        let Some(config) = &self.config else {
            return Ok(());
        };

        loop {
            if cancel.is_some_and(|token| token.is_cancelled()) {
                return Err(ThrottleError::Cancelled);
            }

            let reservation = self.lock().try_reserve(config, estimated_tokens, now());
            let wait = match reservation {
                Reservation::Granted => return Ok(()),
                Reservation::CapExceeded(cap) => return Err(ThrottleError::Capacity(cap)),
                Reservation::WouldBlock(wait) => wait,
            };

            debug!(
                tokens = estimated_tokens,
                wait_ms = wait.as_millis() as u64,
                "Rate window full, waiting"
            );
            progress.on_throttle_wait(wait);

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(ThrottleError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                None => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Count the actual cost of a finished call (e.g. the response text).
    pub fn account_additional_tokens(&self, tokens: u64) -> Result<(), CapacityExceeded> {
        let Some(config) = &self.config else {
            return Ok(());
        };
        self.lock().account(config, tokens, now())
    }

    /// Zero the per-conversation totals. Called at session start.
    pub fn reset_conversation(&self) {
        self.lock().reset_conversation();
    }

    pub fn usage(&self) -> RateUsage {
        self.lock().usage()
    }
}

/// Current instant from tokio's clock so paused-time tests control the window.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
