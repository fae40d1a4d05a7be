//! Progress notification port
//!
//! Defines the interface for narrating a conversation as it runs.

use roundtable_domain::{ConversationMode, Participant, TerminationReason, Turn};
use std::path::Path;
use std::time::Duration;

/// Callback for progress updates during a conversation
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default so adapters only override what they display. Callbacks are
/// synchronous and advisory: they never influence the conversation.
pub trait ConversationNotifier: Send + Sync {
    /// Called once before the first turn
    fn on_session_start(&self, _topic: &str, _participants: &[Participant], _mode: ConversationMode) {}

    /// Called when the moderator picks a speaker in directed mode
    fn on_speaker_selected(&self, _name: &str, _reason: Option<&str>) {}

    /// Called when the moderator ends the conversation or names nobody
    fn on_selector_concluded(&self, _reason: Option<&str>) {}

    /// Called before a participant generates
    fn on_turn_start(&self, _name: &str) {}

    /// Called after a successful turn is recorded
    fn on_turn_complete(&self, _turn: &Turn) {}

    /// Called when a turn fails; the conversation continues
    fn on_turn_failed(&self, _name: &str, _error: &str) {}

    /// Called with the indented heading outline after each turn
    fn on_document_preview(&self, _preview: &str) {}

    // ==================== Side passes ====================

    /// Called with the editor's reply after a review
    fn on_editor_review(&self, _reply: &str) {}

    /// Called when a side pass is skipped or fails
    fn on_side_pass_skipped(&self, _pass: &str, _reason: &str) {}

    /// Called when the fact checker flags a message
    fn on_fact_check_flag(&self, _flag: &str) {}

    /// Called after the context history was compacted
    fn on_history_compacted(&self, _summarized: bool) {}

    /// Called after structured data was written
    fn on_data_extracted(&self, _path: &Path) {}

    // ==================== Resilience ====================

    /// Called before sleeping for a rate-limit retry
    fn on_retry(&self, _label: &str, _attempt: u32, _max_retries: u32, _wait: Duration) {}

    /// Called before sleeping for a full rate window
    fn on_throttle_wait(&self, _wait: Duration) {}

    // ==================== Session end ====================

    /// Called after the document was persisted
    fn on_saved(&self, _path: &Path) {}

    /// Called when persisting the document failed
    fn on_save_failed(&self, _error: &str) {}

    /// Called last, with the reason the session stopped
    fn on_session_end(&self, _reason: TerminationReason, _turns: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoConversationProgress;

impl ConversationNotifier for NoConversationProgress {}
