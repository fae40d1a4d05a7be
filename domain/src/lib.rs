//! Domain layer for roundtable
//!
//! This crate contains the core conversation logic, entities, and value
//! objects. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Shared document
//!
//! Every participant edits one markdown [`SharedDocument`]. Sections are
//! addressed by heading text; all edits are append, insert, or replace.
//!
//! ## Session
//!
//! A [`Session`] is one run from the opening message to a
//! [`TerminationReason`]. Speakers take turns either in fixed order
//! ([`ConversationMode::RoundRobin`]) or as chosen by a moderator
//! ([`ConversationMode::Directed`]).
//!
//! ## Budgets
//!
//! - [`RateBudget`]: per-minute windows and per-conversation caps
//! - [`RetryPolicy`]: exponential backoff for rate-limited calls

pub mod conversation;
pub mod core;
pub mod document;
pub mod prompt;
pub mod rate;
pub mod retry;
pub mod selection;
pub mod tool;

// Re-export commonly used types
pub use conversation::{
    ConversationMode, HISTORY_TRIMMED_MARKER, Participant, SUMMARY_PREFIX, Session,
    TerminationReason, Turn, TurnKind, is_conversation_complete, min_turns_before_conclusion,
    validate_roster,
};
pub use core::{error::DomainError, string::truncate};
pub use document::{DEFAULT_DOCUMENT_PATH, DocumentSnapshot, Heading, SharedDocument};
pub use prompt::PromptTemplate;
pub use rate::{
    CapacityExceeded, RateBudget, RateLimitConfig, RateUsage, Reservation, estimate_tokens,
};
pub use retry::RetryPolicy;
pub use selection::{SpeakerChoice, SpeakerStats, extract_reason, parse_speaker_choice};
pub use tool::{DocumentOperation, ToolCommand, parse_tool_commands};
