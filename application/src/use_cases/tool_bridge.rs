//! Applies fallback tool commands found in model output to the shared document.

use roundtable_domain::{DocumentOperation, SharedDocument, parse_tool_commands};
use std::sync::Arc;
use tracing::debug;

/// Counts from one [`ToolCallBridge::apply_fallback_commands`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolBridgeReport {
    /// Commands that resolved to a document operation and ran
    pub applied: usize,
    /// Commands with an unknown operation or missing arguments
    pub skipped: usize,
}

impl ToolBridgeReport {
    pub fn is_empty(&self) -> bool {
        self.applied == 0 && self.skipped == 0
    }
}

/// Bridge from embedded ` ```tool ` blocks to [`SharedDocument`] edits.
///
/// Best effort throughout: malformed payloads, unknown operations, and save
/// failures are logged at debug level and otherwise ignored.
#[derive(Clone)]
pub struct ToolCallBridge {
    document: Arc<SharedDocument>,
}

impl ToolCallBridge {
    pub fn new(document: Arc<SharedDocument>) -> Self {
        Self { document }
    }

    /// Apply every command in `response_text`, in order.
    pub fn apply_fallback_commands(&self, response_text: &str) -> ToolBridgeReport {
        let mut report = ToolBridgeReport::default();

        for command in parse_tool_commands(response_text) {
            match DocumentOperation::from_command(&command) {
                Some(operation) => {
                    self.apply(&operation);
                    report.applied += 1;
                }
                None => {
                    debug!(tool = %command.tool, "Skipping unrecognised tool command");
                    report.skipped += 1;
                }
            }
        }

        if !report.is_empty() {
            debug!(
                applied = report.applied,
                skipped = report.skipped,
                "Applied fallback tool commands"
            );
        }
        report
    }

    fn apply(&self, operation: &DocumentOperation) {
        let doc = &self.document;
        match operation {
            DocumentOperation::SetTitle { title } => doc.set_title(title),
            DocumentOperation::AddHeading { text, level } => doc.add_heading(text, *level),
            DocumentOperation::AppendParagraph { text } => doc.append_paragraph(text),
            DocumentOperation::InsertAfterHeading { heading, content } => {
                doc.insert_after_heading(heading, content)
            }
            DocumentOperation::ReplaceSection { heading, content } => {
                doc.replace_section(heading, content)
            }
            DocumentOperation::ListHeadings => {
                debug!(outline = %doc.list_headings(), "ListHeadings requested");
            }
            DocumentOperation::SaveToFile { path } => {
                match doc.save_to_file(path.as_deref().unwrap_or_default()) {
                    Ok(saved) => debug!(path = %saved.display(), "Document saved by tool command"),
                    Err(e) => debug!(error = %e, "SaveToFile tool command failed"),
                }
            }
        }
    }
}
