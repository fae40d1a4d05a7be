//! Protection for the upstream generation service.
//!
//! - [`RateLimiter`] - waits for room in the per-minute windows, enforces
//!   per-conversation caps
//! - [`RetryExecutor`] - backs off and retries on rate-limit failures

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateLimiter, ThrottleError};
pub use retry::RetryExecutor;
