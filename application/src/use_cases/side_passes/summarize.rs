//! Context-history compaction.
//!
//! Keeps prompts bounded on long sessions. The oldest lines are replaced by
//! a one-paragraph summary; if that fails, they are dropped behind a marker.
//! The [`Turn`](roundtable_domain::Turn) log is never touched.

use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::select_speaker::SpeakerSelector;
use crate::use_cases::shared::GenerationService;
use roundtable_domain::{PromptTemplate, Session};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// History longer than this is compacted.
pub const SUMMARIZE_THRESHOLD: usize = 15;
/// Oldest lines folded into the summary.
const SUMMARIZED_LINES: usize = 10;
/// Oldest lines dropped when summarization fails.
const TRIMMED_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionOutcome {
    NotNeeded,
    Summarized,
    /// Summarization failed; lines were dropped instead
    Trimmed,
}

pub struct ContextSummarizer<G: TextGenerator + 'static> {
    service: GenerationService<G>,
}

impl<G: TextGenerator + 'static> ContextSummarizer<G> {
    pub fn new(service: GenerationService<G>) -> Self {
        Self { service }
    }

    /// Compact `session`'s history when it is over the threshold.
    ///
    /// With a `selector` (directed mode) the moderator writes the summary.
    pub async fn compact(
        &self,
        session: &mut Session,
        selector: Option<&SpeakerSelector<G>>,
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> CompactionOutcome {
        let history = session.history();
        if history.len() <= SUMMARIZE_THRESHOLD {
            return CompactionOutcome::NotNeeded;
        }

        let history_text = history[..SUMMARIZED_LINES].join("\n");
        let summary = match selector {
            Some(selector) => selector
                .summarize(&history_text, progress)
                .await
                .map_err(|e| e.to_string()),
            None => {
                let request = GenerationRequest::new(
                    PromptTemplate::summarizer_system(),
                    PromptTemplate::summarize(&history_text),
                );
                self.service
                    .generate_metered("Context summarization", &request, cancel, progress)
                    .await
                    .map_err(|e| e.to_string())
            }
        };

        match summary {
            Ok(summary) if !summary.trim().is_empty() => {
                session.compact_history(SUMMARIZED_LINES, &summary);
                debug!(lines = session.history().len(), "Context history summarized");
                CompactionOutcome::Summarized
            }
            Ok(_) => {
                warn!("Summarization returned nothing; trimming history");
                session.trim_history(TRIMMED_LINES);
                CompactionOutcome::Trimmed
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed; trimming history");
                session.trim_history(TRIMMED_LINES);
                CompactionOutcome::Trimmed
            }
        }
    }
}
