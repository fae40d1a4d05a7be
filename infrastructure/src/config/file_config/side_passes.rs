//! Moderator and side-pass configuration from TOML
//! (`[orchestrator]`, `[editor]`, `[fact_check]`, `[structured_data]`)

use serde::{Deserialize, Serialize};

/// Raw moderator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Replaces the built-in moderator instructions
    pub base_system_prompt: Option<String>,
}

/// Raw editor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEditorConfig {
    pub enabled: bool,
    /// Review every N successful turns
    pub intervention_frequency: usize,
    /// Replaces the built-in editor instructions
    pub system_prompt: Option<String>,
}

impl Default for FileEditorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            intervention_frequency: 3,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFactCheckConfig {
    pub enabled: bool,
}

/// Raw structured-data extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStructuredDataConfig {
    pub enabled: bool,
    pub output_file: String,
    /// Free-form description of the JSON to produce
    pub schema_description: String,
}

impl Default for FileStructuredDataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_file: "data.json".to_string(),
            schema_description: String::new(),
        }
    }
}
