//! Text generator port
//!
//! Defines the single operation the engine needs from a model provider:
//! turn a system prompt and a user prompt into text. Participants, the
//! moderator, the editor, and the other side passes are all just callers of
//! this port with their own prompts.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Markers that identify a rate-limit failure in an error message.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "too many requests"];

/// Errors that can occur during text generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Rate limited by provider (HTTP 429)")]
    RateLimited { retry_after: Option<Duration> },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl GenerationError {
    /// Whether this failure is a rate-limit signal worth retrying.
    ///
    /// True for [`GenerationError::RateLimited`], HTTP 429, or any error in
    /// the source chain whose message mentions a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GenerationError::RateLimited { .. } => true,
            GenerationError::Http { status: 429, .. } => true,
            _ => {
                let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
                while let Some(err) = current {
                    if message_signals_rate_limit(&err.to_string()) {
                        return true;
                    }
                    current = err.source();
                }
                false
            }
        }
    }

    /// Provider-supplied wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenerationError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Wrap an arbitrary error.
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        GenerationError::Other(Box::new(err))
    }
}

fn message_signals_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// One generation call: a system prompt and a user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }

    /// Combined text used for token estimation.
    pub fn estimation_text(&self) -> String {
        format!("{}\n\n{}", self.system, self.prompt)
    }
}

/// Port for text generation
///
/// Implementations (adapters) live in the infrastructure layer.
/// The engine enforces no timeout of its own; that is the adapter's job.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for the request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Model or provider label for display
    fn label(&self) -> String {
        "generator".to_string()
    }
}
