//! Tools configuration from TOML (`[tools]` section)
//!
//! Controls the embedded-JSON tool protocol participants use to edit the
//! shared document.
//!
//! ```toml
//! [tools]
//! enable_fallback_json_tools = true
//! require_tools_verification = true   # abort if the model can't drive it
//! ```

use serde::{Deserialize, Serialize};

/// Raw tools configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Describe the protocol in prompts and apply ```tool blocks
    pub enable_fallback_json_tools: bool,
    /// Refuse to start when the pre-flight tool check fails
    pub require_tools_verification: bool,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            enable_fallback_json_tools: true,
            require_tools_verification: false,
        }
    }
}
