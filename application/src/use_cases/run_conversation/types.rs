//! Type definitions for the RunConversation use case.

use crate::config::ConversationParams;
use roundtable_domain::{ConversationMode, DomainError, Participant, Session, TerminationReason};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-time errors. Nothing that happens during a session is fatal.
#[derive(Error, Debug)]
pub enum RunConversationError {
    #[error("Invalid roster: {0}")]
    InvalidRoster(#[from] DomainError),

    #[error("max_turns must be at least 1")]
    InvalidMaxTurns,

    #[error("Directed mode requires a speaker selector")]
    MissingSelector,

    #[error("Speaker selector roster does not match the participants")]
    SelectorRosterMismatch,
}

/// Input for the RunConversation use case
#[derive(Debug, Clone)]
pub struct RunConversationInput {
    pub topic: String,
    /// Speaking order in round-robin mode
    pub participants: Vec<Participant>,
    pub mode: ConversationMode,
    pub params: ConversationParams,
}

impl RunConversationInput {
    pub fn new(
        topic: impl Into<String>,
        participants: Vec<Participant>,
        mode: ConversationMode,
    ) -> Self {
        Self {
            topic: topic.into(),
            participants,
            mode,
            params: ConversationParams::default(),
        }
    }

    pub fn with_params(mut self, params: ConversationParams) -> Self {
        self.params = params;
        self
    }
}

/// Output from the RunConversation use case
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    pub reason: TerminationReason,
    /// Successful participant turns
    pub turns: usize,
    /// `None` when persisting the document failed
    pub saved_path: Option<PathBuf>,
    /// Structured data file, when extraction ran and succeeded
    pub data_path: Option<PathBuf>,
    pub session: Session,
}
