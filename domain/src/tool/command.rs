//! Fallback tool commands and the document operations they resolve to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Namespace of the markdown document tools.
pub const MARKDOWN_NAMESPACE: &str = "markdown";

/// A raw `{ "tool": "<namespace>.<operation>", "args": { ... } }` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Fully qualified tool name
    pub tool: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCommand {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument, accepting numeric strings.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.args.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Operation name within the markdown namespace, lowercased.
    fn markdown_operation(&self) -> Option<String> {
        let (namespace, operation) = self.tool.trim().split_once('.')?;
        namespace
            .eq_ignore_ascii_case(MARKDOWN_NAMESPACE)
            .then(|| operation.to_ascii_lowercase())
    }
}

/// A typed edit or query against the shared document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOperation {
    SetTitle { title: String },
    AddHeading { text: String, level: u8 },
    AppendParagraph { text: String },
    InsertAfterHeading { heading: String, content: String },
    ReplaceSection { heading: String, content: String },
    ListHeadings,
    SaveToFile { path: Option<String> },
}

impl DocumentOperation {
    /// Resolve a raw command. `None` for unknown operations or missing arguments.
    pub fn from_command(command: &ToolCommand) -> Option<Self> {
        let operation = command.markdown_operation()?;
        let heading = || {
            command
                .get_string("headingText")
                .or_else(|| command.get_string("heading"))
                .map(str::to_string)
        };
        let content = || command.get_string("content").map(str::to_string);

        let resolved = match operation.as_str() {
            "settitle" => DocumentOperation::SetTitle {
                title: command.get_string("title")?.to_string(),
            },
            "addheading" => DocumentOperation::AddHeading {
                text: command.get_string("text")?.to_string(),
                level: command
                    .get_i64("level")
                    .map(|l| l.clamp(1, 6) as u8)
                    .unwrap_or(2),
            },
            "appendparagraph" => DocumentOperation::AppendParagraph {
                text: command.get_string("text")?.to_string(),
            },
            "insertafterheading" => DocumentOperation::InsertAfterHeading {
                heading: heading()?,
                content: content()?,
            },
            "replacesection" => DocumentOperation::ReplaceSection {
                heading: heading()?,
                content: content()?,
            },
            "listheadings" => DocumentOperation::ListHeadings,
            "savetofile" => DocumentOperation::SaveToFile {
                path: command.get_string("path").map(str::to_string),
            },
            _ => return None,
        };
        Some(resolved)
    }

    /// Whether the operation changes the document.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            DocumentOperation::ListHeadings | DocumentOperation::SaveToFile { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentOperation::SetTitle { .. } => "SetTitle",
            DocumentOperation::AddHeading { .. } => "AddHeading",
            DocumentOperation::AppendParagraph { .. } => "AppendParagraph",
            DocumentOperation::InsertAfterHeading { .. } => "InsertAfterHeading",
            DocumentOperation::ReplaceSection { .. } => "ReplaceSection",
            DocumentOperation::ListHeadings => "ListHeadings",
            DocumentOperation::SaveToFile { .. } => "SaveToFile",
        }
    }
}
