//! Rate limit configuration.

use serde::{Deserialize, Serialize};

fn default_chars_per_token() -> f64 {
    4.0
}

/// Caps on upstream usage. Every cap is optional; an absent cap is never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per 60-second window
    pub requests_per_minute: Option<u64>,
    /// Estimated tokens allowed per 60-second window
    pub tokens_per_minute: Option<u64>,
    /// Hard cap on requests for the whole conversation
    pub max_requests_per_conversation: Option<u64>,
    /// Hard cap on estimated tokens for the whole conversation
    pub max_tokens_per_conversation: Option<u64>,
    /// Characters per token used by [`estimate_tokens`](super::estimate_tokens)
    #[serde(default = "default_chars_per_token")]
    pub approx_chars_per_token: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: None,
            tokens_per_minute: None,
            max_requests_per_conversation: None,
            max_tokens_per_conversation: None,
            approx_chars_per_token: default_chars_per_token(),
        }
    }
}
