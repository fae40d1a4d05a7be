//! Conversation configuration from TOML (`[conversation]` section)

use roundtable_domain::{ConversationMode, DEFAULT_DOCUMENT_PATH};
use serde::{Deserialize, Serialize};

/// Raw conversation configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    /// Rounds (round-robin) or turns per participant (directed)
    pub max_turns: usize,
    /// "round_robin" or "directed"; kept as a string so validation can
    /// report unknown values
    pub mode: String,
    /// Ask the human director after every turn
    pub interactive: bool,
    /// Compact long context history
    pub context_summarization: bool,
    /// Where the document is written at the end
    pub output_path: String,
    /// Print the heading outline after every turn
    pub show_document_preview: bool,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            mode: ConversationMode::default().to_string(),
            interactive: false,
            context_summarization: false,
            output_path: DEFAULT_DOCUMENT_PATH.to_string(),
            show_document_preview: true,
        }
    }
}

impl FileConversationConfig {
    pub fn parse_mode(&self) -> Option<ConversationMode> {
        self.mode.parse().ok()
    }
}
