//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, ProviderKind};
pub use logging::JsonlTranscriptLogger;
pub use providers::{OpenAiGenerator, ProviderError};
