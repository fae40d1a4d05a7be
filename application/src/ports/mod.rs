//! Port definitions (interfaces for external adapters)

pub mod conversation_logger;
pub mod generator;
pub mod human_intervention;
pub mod progress;
