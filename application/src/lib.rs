//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, the resilience layer,
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ConversationParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    generator::{GenerationError, GenerationRequest, TextGenerator},
    human_intervention::{Directive, DirectorPort, HumanInterventionError, NoDirector},
    progress::{ConversationNotifier, NoConversationProgress},
};
pub use resilience::{RateLimiter, RetryExecutor, ThrottleError};
pub use use_cases::run_conversation::{
    ConversationOutcome, RunConversationError, RunConversationInput, RunConversationUseCase,
};
pub use use_cases::select_speaker::{Selection, SpeakerSelector};
pub use use_cases::side_passes::{
    CompactionOutcome, ContextSummarizer, DataExtractor, EditorOutcome, EditorReviewer,
    ExtractionError, FactCheckOutcome, FactChecker,
};
pub use use_cases::tool_bridge::{ToolBridgeReport, ToolCallBridge};
pub use use_cases::verify_tooling::VerifyToolingUseCase;
pub use use_cases::{GenerationService, TurnError};
