//! Pure rate budget arithmetic.
//!
//! [`RateBudget`] holds the counters; callers pass in the current instant so
//! the window logic can be tested without a clock. The async wait loop built
//! on top of this lives in the application layer.

use super::config::RateLimitConfig;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Length of a rate window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Shortest wait before re-checking a full window.
pub const MIN_WAIT: Duration = Duration::from_millis(100);

/// A hard cap that waiting cannot fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityExceeded {
    #[error("Conversation request cap reached ({limit})")]
    ConversationRequests { limit: u64 },

    #[error("Conversation token cap reached ({limit})")]
    ConversationTokens { limit: u64 },

    #[error("Request of {tokens} tokens exceeds the per-minute token cap ({limit})")]
    RequestTooLarge { tokens: u64, limit: u64 },
}

/// Outcome of [`RateBudget::try_reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// Counters were incremented
    Granted,
    /// A per-minute cap is full; try again after this long
    WouldBlock(Duration),
    /// A hard cap would be exceeded; nothing was reserved
    CapExceeded(CapacityExceeded),
}

/// Snapshot of all four counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateUsage {
    pub window_requests: u64,
    pub window_tokens: u64,
    pub conversation_requests: u64,
    pub conversation_tokens: u64,
}

/// Estimate tokens as `ceil(chars / chars_per_token)`, at least 1.
pub fn estimate_tokens(text: &str, chars_per_token: f64) -> u64 {
    let chars = text.chars().count() as f64;
    let estimate = (chars / chars_per_token.max(1.0)).ceil() as u64;
    estimate.max(1)
}

/// Fixed 60-second window plus per-conversation totals.
#[derive(Debug, Clone)]
pub struct RateBudget {
    window_start: Instant,
    usage: RateUsage,
}

impl RateBudget {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            usage: RateUsage::default(),
        }
    }

    pub fn usage(&self) -> RateUsage {
        self.usage
    }

    /// Start a new window once 60 s have passed since the current one began.
    pub fn roll_window(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= WINDOW {
            self.window_start = now;
            self.usage.window_requests = 0;
            self.usage.window_tokens = 0;
        }
    }

    /// Reset the per-conversation totals. The window is left alone.
    pub fn reset_conversation(&mut self) {
        self.usage.conversation_requests = 0;
        self.usage.conversation_tokens = 0;
    }

    /// Try to reserve one request of `tokens` estimated tokens.
    pub fn try_reserve(&mut self, cfg: &RateLimitConfig, tokens: u64, now: Instant) -> Reservation {
        self.roll_window(now);

        if let Some(limit) = cfg.max_requests_per_conversation
            && self.usage.conversation_requests + 1 > limit
        {
            return Reservation::CapExceeded(CapacityExceeded::ConversationRequests { limit });
        }
        if let Some(limit) = cfg.max_tokens_per_conversation
            && self.usage.conversation_tokens + tokens > limit
        {
            return Reservation::CapExceeded(CapacityExceeded::ConversationTokens { limit });
        }
        if let Some(limit) = cfg.tokens_per_minute
            && tokens > limit
        {
            return Reservation::CapExceeded(CapacityExceeded::RequestTooLarge { tokens, limit });
        }

        let requests_full = cfg
            .requests_per_minute
            .is_some_and(|limit| self.usage.window_requests + 1 > limit);
        let tokens_full = cfg
            .tokens_per_minute
            .is_some_and(|limit| self.usage.window_tokens + tokens > limit);
        if requests_full || tokens_full {
            return Reservation::WouldBlock(self.until_window_rolls(now));
        }

        self.usage.window_requests += 1;
        self.usage.window_tokens += tokens;
        self.usage.conversation_requests += 1;
        self.usage.conversation_tokens += tokens;
        Reservation::Granted
    }

    /// Add the actual cost of a finished call to the window and the totals.
    ///
    /// The tokens are always counted; the error reports that the
    /// conversation total is now above its cap.
    pub fn account(
        &mut self,
        cfg: &RateLimitConfig,
        tokens: u64,
        now: Instant,
    ) -> Result<(), CapacityExceeded> {
        self.roll_window(now);
        self.usage.window_tokens += tokens;
        self.usage.conversation_tokens += tokens;

        match cfg.max_tokens_per_conversation {
            Some(limit) if self.usage.conversation_tokens > limit => {
                Err(CapacityExceeded::ConversationTokens { limit })
            }
            _ => Ok(()),
        }
    }

    fn until_window_rolls(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.window_start);
        WINDOW.saturating_sub(elapsed).max(MIN_WAIT)
    }
}
