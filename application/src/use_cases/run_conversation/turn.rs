//! A single participant turn and the side passes that follow it.

use super::RunConversationUseCase;
use super::types::RunConversationInput;
use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::side_passes::{CompactionOutcome, EditorOutcome, FactCheckOutcome};
use roundtable_domain::core::string::tail;
use roundtable_domain::{Participant, PromptTemplate, Session};
use tracing::{debug, warn};

/// History lines shown to a participant.
const PARTICIPANT_HISTORY_LINES: usize = 3;
/// Rounds left at which participants are told to wrap up.
const WRAP_UP_ROUNDS: usize = 2;

impl<G: TextGenerator + 'static> RunConversationUseCase<G> {
    /// Run one participant turn. Returns the response on success.
    ///
    /// Failures are reported and swallowed; the session is left unchanged.
    pub(super) async fn take_turn(
        &self,
        input: &RunConversationInput,
        guidelines: &str,
        participant: &Participant,
        session: &mut Session,
        progress: &dyn ConversationNotifier,
    ) -> Option<String> {
        progress.on_turn_start(&participant.name);

        let prompt = self.build_turn_prompt(input, guidelines, session);
        let request = GenerationRequest::new(participant.system_prompt.clone(), prompt.clone());

        let response = match self
            .service
            .generate_metered(
                &participant.name,
                &request,
                self.cancellation_token.as_ref(),
                progress,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(participant = %participant.name, error = %e, "Turn failed");
                progress.on_turn_failed(&participant.name, &e.to_string());
                self.log_failure(&participant.name, &e.to_string());
                return None;
            }
        };

        if input.params.enable_fallback_tools {
            self.bridge.apply_fallback_commands(&response);
        }

        let turn = session.record_turn(&participant.name, prompt, response.clone());
        debug!(position = turn.position, speaker = %turn.speaker, "Turn recorded");
        progress.on_turn_complete(turn);
        self.log_turn(turn);

        if input.params.show_document_preview {
            progress.on_document_preview(&self.document_preview());
        }

        self.run_side_passes(input, session, &response, progress)
            .await;
        Some(response)
    }

    fn build_turn_prompt(
        &self,
        input: &RunConversationInput,
        guidelines: &str,
        session: &Session,
    ) -> String {
        // Attempts are counted before the prompt is built and never compacted
        let count = input.participants.len();
        let current_round = session.attempted_turns().saturating_sub(1) / count + 1;
        let rounds_remaining = input.params.max_turns.saturating_sub(current_round);

        PromptTemplate::participant_turn(
            guidelines,
            input
                .params
                .enable_fallback_tools
                .then(PromptTemplate::fallback_tool_protocol),
            &self.document.list_headings(),
            tail(session.history(), PARTICIPANT_HISTORY_LINES),
            session.current_message(),
            (rounds_remaining <= WRAP_UP_ROUNDS).then_some(rounds_remaining),
        )
    }

    /// Heading outline, indented by depth.
    fn document_preview(&self) -> String {
        self.document
            .headings()
            .iter()
            .map(|h| format!("{}{}", "  ".repeat(usize::from(h.level) - 1), h.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn run_side_passes(
        &self,
        input: &RunConversationInput,
        session: &mut Session,
        response: &str,
        progress: &dyn ConversationNotifier,
    ) {
        let cancel = self.cancellation_token.as_ref();
        let frequency = input.params.editor_frequency;

        if let Some(editor) = &self.editor
            && frequency > 0
            && session.participant_turns() % frequency == 0
        {
            match editor.review(session.history(), cancel, progress).await {
                Ok(EditorOutcome::Reviewed { reply, report }) => {
                    debug!(applied = report.applied, "Editor review done");
                    progress.on_editor_review(&reply);
                }
                Ok(EditorOutcome::Skipped(reason)) => {
                    progress.on_side_pass_skipped("editor", reason);
                }
                Err(e) => {
                    warn!(error = %e, "Editor review failed");
                    progress.on_side_pass_skipped("editor", &format!("editor review skipped: {e}"));
                }
            }
        }

        if let Some(checker) = &self.fact_checker {
            match checker.check(response, cancel, progress).await {
                FactCheckOutcome::Flagged(flag) => progress.on_fact_check_flag(&flag),
                FactCheckOutcome::Failed(e) => progress.on_side_pass_skipped("fact_check", &e),
                FactCheckOutcome::Passed | FactCheckOutcome::Skipped => {}
            }
        }

        if input.params.context_summarization {
            let moderator = self
                .selector
                .as_deref()
                .filter(|_| input.mode.is_directed());
            match self
                .summarizer
                .compact(session, moderator, cancel, progress)
                .await
            {
                CompactionOutcome::Summarized => progress.on_history_compacted(true),
                CompactionOutcome::Trimmed => progress.on_history_compacted(false),
                CompactionOutcome::NotNeeded => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversationParams;
    use crate::testing::MockGenerator;
    use crate::use_cases::shared::GenerationService;
    use roundtable_domain::{ConversationMode, SharedDocument};
    use std::sync::Arc;

    fn use_case(doc: &Arc<SharedDocument>) -> RunConversationUseCase<MockGenerator> {
        let generator = Arc::new(MockGenerator::with_replies(Vec::<String>::new()));
        RunConversationUseCase::new(GenerationService::unmetered(generator), doc.clone())
    }

    fn input(max_turns: usize) -> RunConversationInput {
        RunConversationInput::new(
            "t",
            vec![
                Participant::new("Ada", "You are Ada, an engineer."),
                Participant::new("Bob", "You are Bob, a skeptic."),
            ],
            ConversationMode::RoundRobin,
        )
        .with_params(ConversationParams::default().with_max_turns(max_turns))
    }

    #[test]
    fn test_prompt_shows_last_three_lines_and_outline() {
        let doc = Arc::new(SharedDocument::from_markdown("# Plan\n\n## Position\n\n"));
        let mut session = Session::new("t", ConversationMode::RoundRobin);
        for i in 0..5 {
            session.record_turn("Ada", String::new(), format!("msg {i}"));
        }

        let prompt = use_case(&doc).build_turn_prompt(&input(10), "GUIDE", &session);

        assert!(prompt.starts_with("GUIDE"));
        assert!(prompt.contains("markdown.ReplaceSection"));
        assert!(prompt.contains("Current document state:\n# Plan\n## Position"));
        assert!(!prompt.contains("msg 1"));
        assert!(prompt.contains("Ada: msg 2\nAda: msg 3\nAda: msg 4"));
        assert!(prompt.ends_with("Current message: msg 4"));
        assert!(!prompt.contains("IMPORTANT"));
    }

    #[test]
    fn test_wrap_up_warning_near_the_end() {
        let doc = Arc::new(SharedDocument::new());
        let mut session = Session::new("t", ConversationMode::RoundRobin);
        // Third attempt with 2 participants: round 2 of 4
        for _ in 0..3 {
            session.begin_turn();
        }

        let prompt = use_case(&doc).build_turn_prompt(&input(4), "G", &session);

        assert!(prompt.contains("IMPORTANT: Only 2 turn(s) remaining."));
    }

    #[test]
    fn test_prompt_without_fallback_tools() {
        let doc = Arc::new(SharedDocument::new());
        let session = Session::new("t", ConversationMode::RoundRobin);
        let mut input = input(10);
        input.params.enable_fallback_tools = false;

        let prompt = use_case(&doc).build_turn_prompt(&input, "G", &session);

        assert!(!prompt.contains("```tool"));
    }

    #[test]
    fn test_document_preview_indents_by_level() {
        let doc = Arc::new(SharedDocument::from_markdown(
            "# Plan\n\n## Position\n\n### Detail\n\ntext\n",
        ));
        assert_eq!(
            use_case(&doc).document_preview(),
            "Plan\n  Position\n    Detail"
        );
    }
}
