//! Moderator reply parsing and participation bookkeeping for directed mode.
//!
//! Pure text matching, no I/O. The reply format is:
//!
//! ```text
//! <participant name | CONCLUDE>
//! Reason: <optional short reason>
//! ```

use crate::core::string::contains_ignore_case;
use regex::Regex;
use std::sync::LazyLock;

static REASON_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Reason:\s*(.+)").expect("reason pattern is valid"));

/// Keyword the moderator uses to end the conversation.
pub const CONCLUDE_KEYWORD: &str = "CONCLUDE";

/// What a moderator reply asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerChoice {
    /// Roster index of the chosen participant
    Speaker { index: usize, reason: Option<String> },
    Conclude { reason: Option<String> },
    /// No participant could be recognised in the reply
    NoMatch,
}

/// Text after the first `Reason:` marker, trimmed.
pub fn extract_reason(reply: &str) -> Option<String> {
    REASON_LINE
        .captures(reply)
        .map(|caps| caps[1].trim().to_string())
        .filter(|reason| !reason.is_empty())
}

/// Interpret a moderator reply against the roster.
///
/// Only the first non-empty line decides between CONCLUDE and a name.
/// Name matching tries, first hit wins:
/// 1. the whole line equals a name (case-insensitive)
/// 2. the line contains a name
/// 3. the full reply contains a name
pub fn parse_speaker_choice(reply: &str, names: &[&str]) -> SpeakerChoice {
    let Some(first_line) = reply.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return SpeakerChoice::NoMatch;
    };
    let reason = extract_reason(reply);

    if first_line.eq_ignore_ascii_case(CONCLUDE_KEYWORD) {
        return SpeakerChoice::Conclude { reason };
    }

    let exact = || {
        names
            .iter()
            .position(|name| name.to_lowercase() == first_line.to_lowercase())
    };
    let in_line = || {
        names
            .iter()
            .position(|name| contains_ignore_case(first_line, name))
    };
    let anywhere = || names.iter().position(|name| contains_ignore_case(reply, name));

    match exact().or_else(in_line).or_else(anywhere) {
        Some(index) => SpeakerChoice::Speaker { index, reason },
        None => SpeakerChoice::NoMatch,
    }
}

/// How often each participant has been selected, aligned with the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerStats {
    names: Vec<String>,
    counts: Vec<usize>,
}

impl SpeakerStats {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            counts: vec![0; names.len()],
        }
    }

    /// Count one selection. Out-of-range indices are ignored.
    pub fn record(&mut self, index: usize) {
        if let Some(count) = self.counts.get_mut(index) {
            *count += 1;
        }
    }

    pub fn count(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| self.counts[index])
    }

    /// `(name, count)` in roster order.
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.names
            .iter()
            .cloned()
            .zip(self.counts.iter().copied())
            .collect()
    }

    /// `(name, count)` ascending by count, ties in roster order.
    pub fn least_heard_first(&self) -> Vec<(String, usize)> {
        let mut counts = self.counts();
        counts.sort_by_key(|(_, count)| *count);
        counts
    }
}
