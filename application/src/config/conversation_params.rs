//! Conversation parameters: turn scheduler loop control.
//!
//! [`ConversationParams`] groups the static parameters that control the
//! loop in [`RunConversationUseCase`](crate::use_cases::run_conversation::RunConversationUseCase).
//! Which side passes run is decided by what is attached to the use case;
//! these values only tune them.

use roundtable_domain::DEFAULT_DOCUMENT_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Turn scheduler parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationParams {
    /// Rounds in round-robin mode; turn budget is `max_turns * participants`
    /// in directed mode.
    pub max_turns: usize,
    /// Where the document is written at session end.
    pub output_path: PathBuf,
    /// Add the fallback tool protocol to prompts and apply tool blocks.
    pub enable_fallback_tools: bool,
    /// Run the editor every N successful turns (0 disables it).
    pub editor_frequency: usize,
    /// Compact long context history.
    pub context_summarization: bool,
    /// Report the heading outline after each turn.
    pub show_document_preview: bool,
    /// Ask the director after each turn.
    pub interactive: bool,
}

impl Default for ConversationParams {
    fn default() -> Self {
        Self {
            max_turns: 10,
            output_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            enable_fallback_tools: true,
            editor_frequency: 3,
            context_summarization: false,
            show_document_preview: true,
            interactive: false,
        }
    }
}

impl ConversationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_fallback_tools(mut self, enabled: bool) -> Self {
        self.enable_fallback_tools = enabled;
        self
    }

    pub fn with_editor_frequency(mut self, every: usize) -> Self {
        self.editor_frequency = every;
        self
    }

    pub fn with_context_summarization(mut self, enabled: bool) -> Self {
        self.context_summarization = enabled;
        self
    }

    pub fn with_document_preview(mut self, enabled: bool) -> Self {
        self.show_document_preview = enabled;
        self
    }

    pub fn with_interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }
}
