//! Extraction of fallback tool commands from free-form model output.
//!
//! Commands travel inside fenced blocks whose info string is `tool`. A block
//! holds one command object or an array of them. Anything that does not
//! decode is dropped: model output is untrusted and a bad block must never
//! stop the conversation.

use super::command::ToolCommand;
use serde_json::Value;

const FENCE: &str = "```";
const TOOL_INFO_STRING: &str = "tool";

/// Bodies of every ` ```tool ` block, in order.
///
/// A block left open at the end of the text is still returned.
pub fn extract_tool_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        match current.as_mut() {
            None => {
                if let Some(info) = trimmed.strip_prefix(FENCE)
                    && info.trim().eq_ignore_ascii_case(TOOL_INFO_STRING)
                {
                    current = Some(String::new());
                }
            }
            Some(body) => {
                if trimmed == FENCE {
                    blocks.extend(current.take());
                } else {
                    body.push_str(line);
                    body.push('\n');
                }
            }
        }
    }

    blocks.extend(current);
    blocks
}

/// Decode one block body into commands, skipping items that do not decode.
pub fn decode_block(body: &str) -> Vec<ToolCommand> {
    let Ok(value) = serde_json::from_str::<Value>(body.trim()) else {
        return Vec::new();
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::Object(_) => serde_json::from_value(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// All decodable commands in `text`, blocks and array items in order.
pub fn parse_tool_commands(text: &str) -> Vec<ToolCommand> {
    extract_tool_blocks(text)
        .iter()
        .flat_map(|body| decode_block(body))
        .collect()
}
