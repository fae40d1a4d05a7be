//! Speaker selection for directed conversations.
//!
//! Asks the moderator who should speak next and interprets the reply.
//! Participation counts are tracked here and exposed so callers (and tests)
//! can see how balanced the conversation has been.

use crate::ports::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::shared::GenerationService;
use roundtable_domain::core::string::tail;
use roundtable_domain::{
    Participant, PromptTemplate, SharedDocument, SpeakerChoice, SpeakerStats,
    parse_speaker_choice,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// History lines shown to the moderator.
const SELECTOR_HISTORY_LINES: usize = 5;

/// Outcome of one selection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Roster index of the next speaker
    Speaker { index: usize, reason: Option<String> },
    /// The moderator replied CONCLUDE
    Conclude { reason: Option<String> },
    /// No participant could be recognised; `reply` is kept for diagnostics
    NoMatch { reply: String },
}

/// Moderator-driven speaker choice.
pub struct SpeakerSelector<G: TextGenerator + 'static> {
    service: GenerationService<G>,
    document: Arc<SharedDocument>,
    participants: Vec<Participant>,
    system_prompt: String,
    stats: Mutex<SpeakerStats>,
}

impl<G: TextGenerator + 'static> SpeakerSelector<G> {
    /// `base_prompt` replaces the built-in moderator instructions when set.
    pub fn new(
        service: GenerationService<G>,
        document: Arc<SharedDocument>,
        participants: Vec<Participant>,
        base_prompt: Option<&str>,
    ) -> Self {
        let roster: Vec<(String, String)> = participants
            .iter()
            .map(|p| (p.name.clone(), p.describe()))
            .collect();
        let names: Vec<&str> = participants.iter().map(|p| p.name.as_str()).collect();

        Self {
            system_prompt: PromptTemplate::moderator_system(base_prompt, &roster),
            stats: Mutex::new(SpeakerStats::new(&names)),
            service,
            document,
            participants,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn stats(&self) -> MutexGuard<'_, SpeakerStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `(name, times selected)` in roster order.
    pub fn participation_counts(&self) -> Vec<(String, usize)> {
        self.stats().counts()
    }

    pub fn speak_count(&self, name: &str) -> Option<usize> {
        self.stats().count(name)
    }

    /// The user prompt for one selection call.
    pub fn build_context(
        &self,
        current_message: &str,
        history: &[String],
        turns_remaining: usize,
    ) -> String {
        let participation = self.stats().least_heard_first();
        let names: Vec<&str> = self.participants.iter().map(|p| p.name.as_str()).collect();

        PromptTemplate::moderator_context(
            current_message,
            tail(history, SELECTOR_HISTORY_LINES),
            &self.document.list_headings(),
            &participation,
            &names,
            turns_remaining,
        )
    }

    /// Ask the moderator for the next speaker.
    ///
    /// A chosen participant's count goes up by exactly one; CONCLUDE and
    /// unrecognised replies leave the counts alone.
    pub async fn select_next(
        &self,
        current_message: &str,
        history: &[String],
        turns_remaining: usize,
        progress: &dyn ConversationNotifier,
    ) -> Result<Selection, GenerationError> {
        let context = self.build_context(current_message, history, turns_remaining);
        let request = GenerationRequest::new(self.system_prompt.clone(), context);
        let reply = self
            .service
            .generate("Moderator selection", &request, progress)
            .await?;

        let names: Vec<&str> = self.participants.iter().map(|p| p.name.as_str()).collect();
        let selection = match parse_speaker_choice(&reply, &names) {
            SpeakerChoice::Speaker { index, reason } => {
                self.stats().record(index);
                Selection::Speaker { index, reason }
            }
            SpeakerChoice::Conclude { reason } => Selection::Conclude { reason },
            SpeakerChoice::NoMatch => Selection::NoMatch { reply },
        };

        debug!(?selection, turns_remaining, "Moderator decision");
        Ok(selection)
    }

    /// Condense history into one paragraph on the moderator's behalf.
    pub async fn summarize(
        &self,
        history_text: &str,
        progress: &dyn ConversationNotifier,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest::new(
            self.system_prompt.clone(),
            PromptTemplate::summarize(history_text),
        );
        self.service
            .generate("Moderator summarization", &request, progress)
            .await
    }
}
