//! Turn records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Participant,
    /// Text injected by the human director in interactive mode
    Director,
}

/// One contribution to the conversation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Zero-based position in the session's turn log
    pub position: usize,
    pub speaker: String,
    pub kind: TurnKind,
    /// Context the speaker was given
    pub input: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Render the turn as a context-history line.
    pub fn history_line(&self) -> String {
        match self.kind {
            TurnKind::Participant => format!("{}: {}", self.speaker, self.output),
            TurnKind::Director => format!("Director (User): {}", self.output),
        }
    }
}
