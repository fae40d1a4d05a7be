//! Run Conversation use case
//!
//! The turn scheduler. Drives one session from the opening message to
//! termination:
//!
//! | Mode        | Who speaks next                 | Budget                           |
//! |-------------|---------------------------------|----------------------------------|
//! | RoundRobin  | configured order, every round   | `max_turns` rounds               |
//! | Directed    | the moderator's choice          | `max_turns * participants` turns |
//!
//! Turns run strictly one at a time. A failed turn is reported and skipped;
//! only configuration problems surface as [`RunConversationError`].

mod hil;
mod turn;
mod types;

pub use types::{ConversationOutcome, RunConversationError, RunConversationInput};

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::generator::TextGenerator;
use crate::ports::human_intervention::DirectorPort;
use crate::ports::progress::{ConversationNotifier, NoConversationProgress};
use crate::use_cases::select_speaker::{Selection, SpeakerSelector};
use crate::use_cases::shared::{GenerationService, is_cancelled};
use crate::use_cases::side_passes::{ContextSummarizer, DataExtractor, EditorReviewer, FactChecker};
use crate::use_cases::tool_bridge::ToolCallBridge;
use roundtable_domain::{
    ConversationMode, PromptTemplate, Session, SharedDocument, TerminationReason, Turn,
    is_conversation_complete, validate_roster,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Use case for running a conversation
pub struct RunConversationUseCase<G: TextGenerator + 'static> {
    pub(super) service: GenerationService<G>,
    pub(super) document: Arc<SharedDocument>,
    pub(super) bridge: ToolCallBridge,
    pub(super) summarizer: ContextSummarizer<G>,
    pub(super) selector: Option<Arc<SpeakerSelector<G>>>,
    pub(super) editor: Option<EditorReviewer<G>>,
    pub(super) fact_checker: Option<FactChecker<G>>,
    pub(super) extractor: Option<DataExtractor<G>>,
    pub(super) director: Option<Arc<dyn DirectorPort>>,
    pub(super) logger: Arc<dyn ConversationLogger>,
    pub(super) cancellation_token: Option<CancellationToken>,
}

impl<G: TextGenerator + 'static> RunConversationUseCase<G> {
    pub fn new(service: GenerationService<G>, document: Arc<SharedDocument>) -> Self {
        Self {
            bridge: ToolCallBridge::new(document.clone()),
            summarizer: ContextSummarizer::new(service.clone()),
            service,
            document,
            selector: None,
            editor: None,
            fact_checker: None,
            extractor: None,
            director: None,
            logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    /// Set the moderator used in directed mode
    pub fn with_selector(mut self, selector: SpeakerSelector<G>) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    pub fn with_editor(mut self, editor: EditorReviewer<G>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn with_fact_checker(mut self, checker: FactChecker<G>) -> Self {
        self.fact_checker = Some(checker);
        self
    }

    /// Run structured-data extraction at session end
    pub fn with_extractor(mut self, extractor: DataExtractor<G>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the human director consulted after each turn in interactive mode
    pub fn with_director(mut self, director: Arc<dyn DirectorPort>) -> Self {
        self.director = Some(director);
        self
    }

    /// Set the transcript logger
    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn document(&self) -> &Arc<SharedDocument> {
        &self.document
    }

    /// Execute the conversation without progress reporting
    pub async fn execute(
        &self,
        input: RunConversationInput,
    ) -> Result<ConversationOutcome, RunConversationError> {
        self.execute_with_progress(input, &NoConversationProgress)
            .await
    }

    /// Execute the conversation with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConversationInput,
        progress: &dyn ConversationNotifier,
    ) -> Result<ConversationOutcome, RunConversationError> {
        self.validate(&input)?;

        info!(
            topic = %input.topic,
            mode = %input.mode,
            participants = input.participants.len(),
            max_turns = input.params.max_turns,
            "Starting conversation"
        );

        self.service.limiter().reset_conversation();
        progress.on_session_start(&input.topic, &input.participants, input.mode);

        let mut session = Session::new(input.topic.clone(), input.mode);
        let guidelines =
            PromptTemplate::collaboration_guidelines(input.participants.len(), input.params.max_turns);

        match input.mode {
            ConversationMode::RoundRobin => {
                self.run_round_robin(&input, &guidelines, &mut session, progress)
                    .await
            }
            ConversationMode::Directed => {
                self.run_directed(&input, &guidelines, &mut session, progress)
                    .await
            }
        }
        session.terminate(TerminationReason::MaxTurnsReached);

        Ok(self.finish(&input, session, progress).await)
    }

    fn validate(&self, input: &RunConversationInput) -> Result<(), RunConversationError> {
        validate_roster(&input.participants)?;
        if input.params.max_turns == 0 {
            return Err(RunConversationError::InvalidMaxTurns);
        }
        if input.mode.is_directed() {
            let selector = self
                .selector
                .as_ref()
                .ok_or(RunConversationError::MissingSelector)?;
            let same_roster = selector.participants().len() == input.participants.len()
                && selector
                    .participants()
                    .iter()
                    .zip(&input.participants)
                    .all(|(a, b)| a.name == b.name);
            if !same_roster {
                return Err(RunConversationError::SelectorRosterMismatch);
            }
        }
        Ok(())
    }

    /// Cancellation check between turns; marks the session when it fires.
    fn stop_if_cancelled(&self, session: &mut Session) -> bool {
        if is_cancelled(&self.cancellation_token) {
            info!("Conversation cancelled");
            session.terminate(TerminationReason::Cancelled);
            return true;
        }
        false
    }

    async fn run_round_robin(
        &self,
        input: &RunConversationInput,
        guidelines: &str,
        session: &mut Session,
        progress: &dyn ConversationNotifier,
    ) {
        let max_turns = input.params.max_turns;
        let count = input.participants.len();

        for round in 0..max_turns {
            session.set_round(round);
            for participant in &input.participants {
                if self.stop_if_cancelled(session) {
                    return;
                }

                let attempted = session.begin_turn();
                let Some(response) = self
                    .take_turn(input, guidelines, participant, session, progress)
                    .await
                else {
                    continue;
                };

                if is_conversation_complete(&response, attempted, max_turns, count) {
                    info!(turn = attempted, "Participants concluded the conversation");
                    session.terminate(TerminationReason::GoalReached);
                    return;
                }
                if self.consult_director(input, session, progress).await {
                    return;
                }
            }
        }
    }

    async fn run_directed(
        &self,
        input: &RunConversationInput,
        guidelines: &str,
        session: &mut Session,
        progress: &dyn ConversationNotifier,
    ) {
        // validate() guarantees a selector in directed mode
        let Some(selector) = self.selector.as_ref() else {
            return;
        };
        let budget = input.params.max_turns * input.participants.len();
        let mut used = 0;

        while used < budget {
            if self.stop_if_cancelled(session) {
                return;
            }
            let turns_remaining = budget - used;
            used += 1;

            let selection = match selector
                .select_next(
                    session.current_message(),
                    session.history(),
                    turns_remaining,
                    progress,
                )
                .await
            {
                Ok(selection) => selection,
                Err(e) => {
                    warn!(error = %e, "Speaker selection failed");
                    progress.on_turn_failed("Moderator", &e.to_string());
                    self.log_failure("Moderator", &e.to_string());
                    continue;
                }
            };

            let (index, reason) = match selection {
                Selection::Speaker { index, reason } => (index, reason),
                Selection::Conclude { reason } => {
                    info!(reason = ?reason, "Moderator concluded the conversation");
                    progress.on_selector_concluded(reason.as_deref());
                    session.terminate(TerminationReason::SelectorConcluded);
                    return;
                }
                Selection::NoMatch { reply } => {
                    warn!(reply = %reply, "Moderator named no participant");
                    progress.on_selector_concluded(None);
                    session.terminate(TerminationReason::NoSelectableSpeaker);
                    return;
                }
            };

            let participant = &input.participants[index];
            progress.on_speaker_selected(&participant.name, reason.as_deref());
            self.logger.log(ConversationEvent::new(
                "speaker_selected",
                json!({ "speaker": participant.name, "reason": reason }),
            ));

            session.begin_turn();
            if self
                .take_turn(input, guidelines, participant, session, progress)
                .await
                .is_some()
                && self.consult_director(input, session, progress).await
            {
                return;
            }
        }
    }

    /// Extraction, persistence, then the final report.
    async fn finish(
        &self,
        input: &RunConversationInput,
        session: Session,
        progress: &dyn ConversationNotifier,
    ) -> ConversationOutcome {
        let reason = session
            .termination()
            .unwrap_or(TerminationReason::MaxTurnsReached);

        let data_path = match &self.extractor {
            Some(extractor) => match extractor
                .extract(
                    session.history(),
                    self.cancellation_token.as_ref(),
                    progress,
                )
                .await
            {
                Ok(path) => {
                    progress.on_data_extracted(&path);
                    Some(path)
                }
                Err(e) => {
                    warn!(error = %e, "Structured data extraction failed");
                    progress.on_side_pass_skipped("extraction", &e.to_string());
                    None
                }
            },
            None => None,
        };

        let saved_path = match self.document.save_to_file(&input.params.output_path) {
            Ok(path) => {
                progress.on_saved(&path);
                Some(path)
            }
            Err(e) => {
                warn!(
                    path = %input.params.output_path.display(),
                    error = %e,
                    "Failed to save document"
                );
                progress.on_save_failed(&e.to_string());
                None
            }
        };

        let turns = session.participant_turns();
        info!(%reason, turns, "Conversation finished");
        self.logger.log(ConversationEvent::new(
            "session_end",
            json!({
                "reason": reason,
                "turns": turns,
                "saved_path": saved_path.as_ref().map(|p| p.display().to_string()),
            }),
        ));
        progress.on_session_end(reason, turns);

        ConversationOutcome {
            reason,
            turns,
            saved_path,
            data_path,
            session,
        }
    }

    pub(super) fn log_turn(&self, turn: &Turn) {
        self.logger.log(ConversationEvent::new(
            "turn",
            json!({
                "position": turn.position,
                "speaker": turn.speaker,
                "kind": turn.kind,
                "output": turn.output,
            }),
        ));
    }

    pub(super) fn log_failure(&self, speaker: &str, error: &str) {
        self.logger.log(ConversationEvent::new(
            "turn_failed",
            json!({ "speaker": speaker, "error": error }),
        ));
    }
}
