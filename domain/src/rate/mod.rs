//! Rate budget: per-minute windows and per-conversation caps.

pub mod budget;
pub mod config;

pub use budget::{
    CapacityExceeded, MIN_WAIT, RateBudget, RateUsage, Reservation, WINDOW, estimate_tokens,
};
pub use config::RateLimitConfig;
