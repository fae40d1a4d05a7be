//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod conversation;
mod logging;
mod providers;
mod side_passes;
mod tools;

pub use conversation::FileConversationConfig;
pub use logging::FileLoggingConfig;
pub use providers::{FileProviderConfig, ProviderKind};
pub use side_passes::{
    FileEditorConfig, FileFactCheckConfig, FileOrchestratorConfig, FileStructuredDataConfig,
};
pub use tools::FileToolsConfig;

use roundtable_application::ConversationParams;
use roundtable_domain::{Participant, RateLimitConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("conversation.max_turns cannot be 0")]
    InvalidMaxTurns,

    #[error("unknown conversation.mode '{0}' (expected round_robin or directed)")]
    UnknownMode(String),

    #[error("participant name cannot be empty")]
    EmptyParticipantName,

    #[error("duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("rate_limit.approx_chars_per_token must be positive")]
    InvalidCharsPerToken,

    #[error("retry.backoff_multiplier must be at least 1.0")]
    InvalidBackoffMultiplier,

    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,
}

/// Raw participant entry (`[[participants]]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileParticipant {
    pub name: String,
    pub system_prompt: String,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub conversation: FileConversationConfig,
    pub provider: FileProviderConfig,
    pub participants: Vec<FileParticipant>,
    /// Absent means no rate limiting at all
    pub rate_limit: Option<RateLimitConfig>,
    pub retry: RetryPolicy,
    pub orchestrator: FileOrchestratorConfig,
    pub editor: FileEditorConfig,
    pub fact_check: FileFactCheckConfig,
    pub structured_data: FileStructuredDataConfig,
    pub tools: FileToolsConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.conversation.max_turns == 0 {
            return Err(ConfigValidationError::InvalidMaxTurns);
        }
        if self.conversation.parse_mode().is_none() {
            return Err(ConfigValidationError::UnknownMode(
                self.conversation.mode.clone(),
            ));
        }

        let mut seen = HashSet::new();
        for participant in &self.participants {
            let name = participant.name.trim();
            if name.is_empty() {
                return Err(ConfigValidationError::EmptyParticipantName);
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigValidationError::DuplicateParticipant(name.to_string()));
            }
        }

        // NaN fails this check too
        if let Some(rate) = &self.rate_limit
            && !(rate.approx_chars_per_token > 0.0)
        {
            return Err(ConfigValidationError::InvalidCharsPerToken);
        }
        if !(self.retry.backoff_multiplier >= 1.0) {
            return Err(ConfigValidationError::InvalidBackoffMultiplier);
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        Ok(())
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.participants
            .iter()
            .map(|p| Participant::new(p.name.trim(), p.system_prompt.clone()))
            .collect()
    }

    /// Scheduler parameters derived from the file.
    pub fn conversation_params(&self) -> ConversationParams {
        ConversationParams::default()
            .with_max_turns(self.conversation.max_turns)
            .with_output_path(&self.conversation.output_path)
            .with_fallback_tools(self.tools.enable_fallback_json_tools)
            .with_editor_frequency(self.editor.intervention_frequency)
            .with_context_summarization(self.conversation.context_summarization)
            .with_document_preview(self.conversation.show_document_preview)
            .with_interactive(self.conversation.interactive)
    }
}
