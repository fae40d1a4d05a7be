//! Periodic editor review of the shared document.

use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::shared::{GenerationService, TurnError};
use crate::use_cases::tool_bridge::{ToolBridgeReport, ToolCallBridge};
use roundtable_domain::core::string::tail;
use roundtable_domain::{PromptTemplate, SharedDocument};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// History lines given to the editor as context.
const EDITOR_HISTORY_LINES: usize = 6;

/// Result of one review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Nothing to review yet
    Skipped(&'static str),
    /// The editor replied; its tool commands were applied
    Reviewed { reply: String, report: ToolBridgeReport },
}

/// Editor that tightens the document through the same tool protocol the
/// participants use.
pub struct EditorReviewer<G: TextGenerator + 'static> {
    service: GenerationService<G>,
    document: Arc<SharedDocument>,
    bridge: ToolCallBridge,
    system_prompt: String,
}

impl<G: TextGenerator + 'static> EditorReviewer<G> {
    /// `base_prompt` replaces the built-in editor instructions when set.
    pub fn new(
        service: GenerationService<G>,
        document: Arc<SharedDocument>,
        base_prompt: Option<&str>,
    ) -> Self {
        let system_prompt = format!(
            "{}\n\n{}",
            PromptTemplate::editor_system(base_prompt),
            PromptTemplate::fallback_tool_protocol()
        );
        Self {
            service,
            bridge: ToolCallBridge::new(document.clone()),
            document,
            system_prompt,
        }
    }

    pub async fn review(
        &self,
        history: &[String],
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> Result<EditorOutcome, TurnError> {
        let content = self.document.content();
        if content.trim().is_empty() {
            return Ok(EditorOutcome::Skipped("Document is empty"));
        }

        let recent = tail(history, EDITOR_HISTORY_LINES);
        let recent_context = if recent.is_empty() {
            "No recent conversation".to_string()
        } else {
            recent.join("\n")
        };

        let request = GenerationRequest::new(
            self.system_prompt.clone(),
            PromptTemplate::editor_review(&content, &recent_context),
        );
        let reply = self
            .service
            .generate_metered("Editor review", &request, cancel, progress)
            .await?;

        let report = self.bridge.apply_fallback_commands(&reply);
        Ok(EditorOutcome::Reviewed { reply, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoConversationProgress;
    use crate::testing::MockGenerator;

    #[tokio::test]
    async fn test_empty_document_is_skipped() {
        let generator = Arc::new(MockGenerator::with_replies(["unused"]));
        let editor = EditorReviewer::new(
            GenerationService::unmetered(generator.clone()),
            Arc::new(SharedDocument::new()),
            None,
        );

        let outcome = editor.review(&[], None, &NoConversationProgress).await.unwrap();

        assert_eq!(outcome, EditorOutcome::Skipped("Document is empty"));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_editor_edits_through_tool_protocol() {
        let doc = Arc::new(SharedDocument::from_markdown(
            "# Plan\n\n## Position\n\nA very long rambling paragraph.\n\n",
        ));
        let reply = "Tightened.\n```tool\n{\"tool\":\"markdown.ReplaceSection\",\"args\":{\"headingText\":\"Position\",\"content\":\"Ship it.\"}}\n```";
        let generator = Arc::new(MockGenerator::with_replies([reply]));
        let editor =
            EditorReviewer::new(GenerationService::unmetered(generator.clone()), doc.clone(), None);

        let history: Vec<String> = (0..10).map(|i| format!("Ada: point {i}")).collect();
        let outcome = editor
            .review(&history, None, &NoConversationProgress)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            EditorOutcome::Reviewed { report: ToolBridgeReport { applied: 1, .. }, .. }
        ));
        assert_eq!(doc.content(), "# Plan\n\n## Position\n\nShip it.\n\n");

        let prompt = &generator.requests()[0].prompt;
        assert!(prompt.contains("A very long rambling paragraph."));
        assert!(!prompt.contains("point 3"));
        assert!(prompt.contains("point 4") && prompt.contains("point 9"));
    }
}
