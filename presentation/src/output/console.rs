//! Console output for a finished conversation

use colored::Colorize;
use roundtable_application::ConversationOutcome;
use roundtable_domain::TurnKind;
use serde_json::json;

/// Formats the outcome of a conversation for display
pub struct OutcomeFormatter;

impl OutcomeFormatter {
    /// Summary followed by the final document
    pub fn format(outcome: &ConversationOutcome, document: &str) -> String {
        let mut output = Self::format_summary(outcome);
        output.push_str(&Self::section_header("Final Document"));
        output.push('\n');
        if document.trim().is_empty() {
            output.push_str(&format!("{}\n", "(empty)".dimmed()));
        } else {
            output.push_str(document.trim_end());
            output.push('\n');
        }
        output.push_str(&Self::footer());
        output
    }

    /// Session statistics only
    pub fn format_summary(outcome: &ConversationOutcome) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Roundtable Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Topic:".cyan().bold(),
            outcome.session.topic
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Ended:".cyan().bold(),
            outcome.reason
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Turns:".cyan().bold(),
            outcome.turns
        ));

        let mut counts: Vec<(&str, usize)> = Vec::new();
        for turn in outcome
            .session
            .turns()
            .iter()
            .filter(|t| t.kind == TurnKind::Participant)
        {
            match counts.iter_mut().find(|(name, _)| *name == turn.speaker) {
                Some((_, count)) => *count += 1,
                None => counts.push((&turn.speaker, 1)),
            }
        }
        if !counts.is_empty() {
            output.push_str(&format!("{}\n", "Participation:".cyan().bold()));
            for (name, count) in counts {
                output.push_str(&format!("  * {}: {}\n", name, count));
            }
        }

        match &outcome.saved_path {
            Some(path) => output.push_str(&format!(
                "{} {}\n",
                "Document:".green().bold(),
                path.display()
            )),
            None => output.push_str(&format!("{} not saved\n", "Document:".red().bold())),
        }
        if let Some(path) = &outcome.data_path {
            output.push_str(&format!(
                "{} {}\n",
                "Data:".green().bold(),
                path.display()
            ));
        }
        output
    }

    /// Machine-readable report, including every turn
    pub fn format_json(outcome: &ConversationOutcome, document: &str) -> String {
        let report = json!({
            "topic": outcome.session.topic,
            "mode": outcome.session.mode,
            "reason": outcome.reason,
            "turns": outcome.turns,
            "saved_path": outcome.saved_path.as_ref().map(|p| p.display().to_string()),
            "data_path": outcome.data_path.as_ref().map(|p| p.display().to_string()),
            "transcript": outcome.session.turns(),
            "document": document,
        });
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "═".repeat(60);
        format!(
            "\n{}\n  {}\n{}\n",
            line.cyan(),
            title.cyan().bold(),
            line.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).cyan().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "═".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{ConversationMode, Session, TerminationReason};
    use std::path::PathBuf;

    fn outcome() -> ConversationOutcome {
        let mut session = Session::new("Caching layer", ConversationMode::RoundRobin);
        session.record_turn("Ada", String::new(), "Use Redis.".to_string());
        session.record_turn("Bob", String::new(), "Too heavy.".to_string());
        session.record_turn("Ada", String::new(), "In-process then.".to_string());
        ConversationOutcome {
            reason: TerminationReason::GoalReached,
            turns: 3,
            saved_path: Some(PathBuf::from("conversation.md")),
            data_path: None,
            session,
        }
    }

    #[test]
    fn test_format_summary() {
        let text = OutcomeFormatter::format_summary(&outcome());
        assert!(text.contains("Caching layer"));
        assert!(text.contains("conversation goal reached"));
        assert!(text.contains("Ada: 2"));
        assert!(text.contains("Bob: 1"));
        assert!(text.contains("conversation.md"));
        assert!(!text.contains("Data:"));
    }

    #[test]
    fn test_format_includes_document() {
        let text = OutcomeFormatter::format(&outcome(), "# Plan\n\nIn-process cache.\n\n");
        assert!(text.contains("# Plan\n\nIn-process cache.\n"));

        let empty = OutcomeFormatter::format(&outcome(), "  ");
        assert!(empty.contains("(empty)"));
    }

    #[test]
    fn test_unsaved_document_is_reported() {
        let mut outcome = outcome();
        outcome.saved_path = None;
        let text = OutcomeFormatter::format_summary(&outcome);
        assert!(text.contains("not saved"));
    }

    #[test]
    fn test_format_json() {
        let text = OutcomeFormatter::format_json(&outcome(), "# Plan\n");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["reason"], "goal_reached");
        assert_eq!(value["mode"], "round_robin");
        assert_eq!(value["turns"], 3);
        assert_eq!(value["transcript"].as_array().unwrap().len(), 3);
        assert_eq!(value["transcript"][1]["speaker"], "Bob");
        assert_eq!(value["document"], "# Plan\n");
        assert!(value["data_path"].is_null());
    }
}
