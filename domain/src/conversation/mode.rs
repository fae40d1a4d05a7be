//! Scheduling mode for a conversation.
//!
//! - RoundRobin: participants speak in configured order, round after round
//! - Directed: a moderator call picks the next speaker every turn

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the next speaker is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// Fixed order, repeated for `max_turns` rounds
    #[default]
    RoundRobin,
    /// Speaker chosen per turn by the moderator
    Directed,
}

impl ConversationMode {
    /// Get a short description for display
    pub fn short_description(&self) -> &'static str {
        match self {
            ConversationMode::RoundRobin => "Round-robin (sequential turns)",
            ConversationMode::Directed => "Directed (moderator picks each speaker)",
        }
    }

    pub fn is_directed(&self) -> bool {
        matches!(self, ConversationMode::Directed)
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationMode::RoundRobin => write!(f, "round_robin"),
            ConversationMode::Directed => write!(f, "directed"),
        }
    }
}

impl std::str::FromStr for ConversationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round_robin" | "round-robin" | "roundrobin" | "rr" => Ok(ConversationMode::RoundRobin),
            "directed" | "orchestrated" | "d" => Ok(ConversationMode::Directed),
            _ => Err(DomainError::InvalidMode(s.to_string())),
        }
    }
}
