//! Early-completion detection for round-robin conversations.
//!
//! Only a handful of very explicit phrases count, and only once most of the
//! turn budget has been used. Ending too late is cheaper than ending too early.

/// Phrases that signal the participants consider the work done.
pub const COMPLETION_PHRASES: &[&str] = &[
    "this conversation is now complete",
    "our work here is finished",
    "ready to end this discussion",
];

/// Minimum attempted turns before a completion phrase is honoured:
/// `max(6, ceil(0.8 * max_turns * participant_count))`.
pub fn min_turns_before_conclusion(max_turns: usize, participant_count: usize) -> usize {
    let total = max_turns * participant_count;
    // ceil(total * 4 / 5) in integer math
    let eighty_percent = (total * 4).div_ceil(5);
    eighty_percent.max(6)
}

/// Whether `response` contains a completion phrase (case-insensitive).
pub fn contains_completion_phrase(response: &str) -> bool {
    let lower = response.to_lowercase();
    COMPLETION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Whether a round-robin session may end after this turn.
///
/// `attempted_turns` counts every individual turn attempted so far,
/// including the one that produced `response`.
pub fn is_conversation_complete(
    response: &str,
    attempted_turns: usize,
    max_turns: usize,
    participant_count: usize,
) -> bool {
    attempted_turns >= min_turns_before_conclusion(max_turns, participant_count)
        && contains_completion_phrase(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_turns_floor_of_six() {
        assert_eq!(min_turns_before_conclusion(1, 1), 6);
        assert_eq!(min_turns_before_conclusion(2, 3), 6);
    }

    #[test]
    fn test_min_turns_eighty_percent_rounds_up() {
        // 10 * 3 = 30 -> 24
        assert_eq!(min_turns_before_conclusion(10, 3), 24);
        // 3 * 3 = 9 -> 7.2 -> 8
        assert_eq!(min_turns_before_conclusion(3, 3), 8);
    }

    #[test]
    fn test_phrase_matching_is_case_insensitive() {
        assert!(contains_completion_phrase(
            "I think This Conversation Is Now Complete."
        ));
        assert!(!contains_completion_phrase("We are nearly done"));
    }

    #[test]
    fn test_never_completes_before_threshold() {
        let response = "Our work here is finished.";
        // 3 participants, 10 rounds -> threshold 24
        for attempted in 1..24 {
            assert!(!is_conversation_complete(response, attempted, 10, 3));
        }
        assert!(is_conversation_complete(response, 24, 10, 3));
    }
}
