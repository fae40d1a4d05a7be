//! Retry policy for rate-limited upstream calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff settings. Each executor owns its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Wait before the first retry
    pub initial_delay_seconds: f64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Factor applied to the delay after every retry
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_seconds: 30.0,
            max_retries: 5,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt + 1`: `initial * multiplier^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay_seconds.max(0.0) * self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}
