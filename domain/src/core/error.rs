//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No participants configured for the conversation")]
    NoParticipants,

    #[error("Duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    #[error("Invalid conversation mode: {0}")]
    InvalidMode(String),
}
