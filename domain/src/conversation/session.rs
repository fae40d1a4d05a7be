//! Session state owned by the turn scheduler.

use super::mode::ConversationMode;
use super::turn::{Turn, TurnKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker left in the context history when old lines are dropped without a summary.
pub const HISTORY_TRIMMED_MARKER: &str = "[... older history removed to save context ...]";

/// Prefix of a summary line that replaces compacted history.
pub const SUMMARY_PREFIX: &str = "[Summary of previous turns]: ";

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The turn budget ran out
    MaxTurnsReached,
    /// A participant used a completion phrase late enough in round-robin
    GoalReached,
    /// The moderator replied CONCLUDE
    SelectorConcluded,
    /// The moderator reply named no participant
    NoSelectableSpeaker,
    /// The human director ended the session
    DirectorQuit,
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::MaxTurnsReached => "maximum turns reached",
            TerminationReason::GoalReached => "conversation goal reached",
            TerminationReason::SelectorConcluded => "moderator concluded the conversation",
            TerminationReason::NoSelectableSpeaker => "moderator could not select a speaker",
            TerminationReason::DirectorQuit => "director ended the conversation",
            TerminationReason::Cancelled => "cancelled",
        };
        write!(f, "{}", text)
    }
}

/// One run of the scheduler from first turn to termination.
///
/// Keeps two views of what was said: the append-only [`Turn`] log and the
/// rendered context history fed back into prompts. Only the latter is ever
/// compacted.
#[derive(Debug, Clone)]
pub struct Session {
    pub topic: String,
    pub mode: ConversationMode,
    turns: Vec<Turn>,
    history: Vec<String>,
    current_message: String,
    /// Participant turns attempted, successful or not
    attempted_turns: usize,
    /// Zero-based round-robin round
    round: usize,
    termination: Option<TerminationReason>,
}

impl Session {
    pub fn new(topic: impl Into<String>, mode: ConversationMode) -> Self {
        let topic = topic.into();
        let current_message = format!("Let's discuss: {}", topic);
        Self {
            topic,
            mode,
            turns: Vec::new(),
            history: Vec::new(),
            current_message,
            attempted_turns: 0,
            round: 0,
            termination: None,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn current_message(&self) -> &str {
        &self.current_message
    }

    pub fn attempted_turns(&self) -> usize {
        self.attempted_turns
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn set_round(&mut self, round: usize) {
        self.round = round;
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Count a participant turn attempt; returns the new total.
    pub fn begin_turn(&mut self) -> usize {
        self.attempted_turns += 1;
        self.attempted_turns
    }

    /// Number of successful participant turns.
    pub fn participant_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.kind == TurnKind::Participant)
            .count()
    }

    /// Record a successful participant turn.
    pub fn record_turn(&mut self, speaker: &str, input: String, output: String) -> &Turn {
        self.push(speaker, TurnKind::Participant, input, output)
    }

    /// Record a director injection; its attributed line becomes the current message.
    pub fn inject_director(&mut self, text: String) -> &Turn {
        self.push("Director", TurnKind::Director, String::new(), text)
    }

    fn push(&mut self, speaker: &str, kind: TurnKind, input: String, output: String) -> &Turn {
        let turn = Turn {
            position: self.turns.len(),
            speaker: speaker.to_string(),
            kind,
            input,
            output,
            timestamp: Utc::now(),
        };
        let line = turn.history_line();
        self.current_message = match kind {
            TurnKind::Participant => turn.output.clone(),
            TurnKind::Director => line.clone(),
        };
        self.history.push(line);
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Replace the oldest `count` history lines with a summary line.
    pub fn compact_history(&mut self, count: usize, summary: &str) {
        let count = count.min(self.history.len());
        self.history.drain(..count);
        self.history
            .insert(0, format!("{}{}", SUMMARY_PREFIX, summary.trim()));
    }

    /// Drop the oldest `count` history lines and leave a marker in their place.
    pub fn trim_history(&mut self, count: usize) {
        let count = count.min(self.history.len());
        self.history.drain(..count);
        self.history.insert(0, HISTORY_TRIMMED_MARKER.to_string());
    }

    /// Set the termination reason. The first reason wins.
    pub fn terminate(&mut self, reason: TerminationReason) {
        if self.termination.is_none() {
            self.termination = Some(reason);
        }
    }
}
