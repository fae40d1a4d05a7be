//! Conversation participants.

use crate::core::error::DomainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Matches the "You are <Name>, <description>" opener of a persona prompt.
static PERSONA_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)You are [^,]+,\s*(.+?)(?:\.|You|Your|\n)")
        .expect("persona pattern is valid")
});

const DESCRIPTION_MAX_CHARS: usize = 150;
const FALLBACK_MAX_CHARS: usize = 100;

/// A named agent with its own system prompt.
///
/// Participants are immutable once created. The scheduler and the speaker
/// selector refer to them by index into the configured roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub system_prompt: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// One-line description for the moderator's roster.
    ///
    /// Prefers the clause after "You are <Name>," up to the first sentence
    /// end, capped at 150 chars. Otherwise the first ~100 chars of the prompt.
    pub fn describe(&self) -> String {
        if let Some(caps) = PERSONA_OPENER.captures(&self.system_prompt) {
            let desc = caps[1].trim();
            let first_sentence = desc.split('.').next().unwrap_or(desc);
            return cap_chars(first_sentence, DESCRIPTION_MAX_CHARS);
        }
        cap_chars(&self.system_prompt, FALLBACK_MAX_CHARS)
    }
}

/// Keep at most `max` chars, replacing the overflow with "..." (char based).
fn cap_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Check a roster before a session starts: non-empty, named, unique.
pub fn validate_roster(participants: &[Participant]) -> Result<(), DomainError> {
    if participants.is_empty() {
        return Err(DomainError::NoParticipants);
    }

    let mut seen = HashSet::new();
    for participant in participants {
        let name = participant.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidParticipant(
                "participant name must not be empty".to_string(),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(DomainError::DuplicateParticipant(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_extracts_persona_clause() {
        let p = Participant::new(
            "Ada",
            "You are Ada, a pragmatic systems engineer who values simplicity. You speak plainly.",
        );
        assert_eq!(
            p.describe(),
            "a pragmatic systems engineer who values simplicity"
        );
    }

    #[test]
    fn test_describe_stops_at_newline() {
        let p = Participant::new("Bob", "You are Bob, a skeptic\nAlways ask for evidence.");
        assert_eq!(p.describe(), "a skeptic");
    }

    #[test]
    fn test_describe_caps_long_clause() {
        let clause = "x".repeat(200);
        let p = Participant::new("Cy", format!("You are Cy, {clause}."));
        let description = p.describe();
        assert_eq!(description.chars().count(), 150);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_describe_fallback_to_prompt_prefix() {
        let short = Participant::new("Dee", "Focus on cost.");
        assert_eq!(short.describe(), "Focus on cost.");

        let long = Participant::new("Eve", "z".repeat(120));
        let description = long.describe();
        assert_eq!(description.chars().count(), 100);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_validate_roster() {
        assert_eq!(validate_roster(&[]), Err(DomainError::NoParticipants));

        let ok = [Participant::new("Ada", "a"), Participant::new("Bob", "b")];
        assert!(validate_roster(&ok).is_ok());

        let dup = [Participant::new("Ada", "a"), Participant::new("ada", "b")];
        assert_eq!(
            validate_roster(&dup),
            Err(DomainError::DuplicateParticipant("ada".to_string()))
        );

        let blank = [Participant::new("  ", "a")];
        assert!(matches!(
            validate_roster(&blank),
            Err(DomainError::InvalidParticipant(_))
        ));
    }
}
