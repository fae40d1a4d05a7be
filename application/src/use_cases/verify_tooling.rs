//! Pre-flight check that the generator can drive the fallback tool protocol.

use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::shared::GenerationService;
use crate::use_cases::tool_bridge::ToolCallBridge;
use roundtable_domain::core::string::contains_ignore_case;
use roundtable_domain::{PromptTemplate, SharedDocument};
use std::sync::Arc;
use tracing::{info, warn};

const EXPECTED_TITLE: &str = "# Verification Title";
const EXPECTED_SECTION: &str = "## Verification Section";
const EXPECTED_PARAGRAPH: &str = "verification paragraph";

/// Asks for a known set of edits and checks they landed.
///
/// The document is always restored to its prior content, whatever the
/// outcome.
pub struct VerifyToolingUseCase<G: TextGenerator + 'static> {
    service: GenerationService<G>,
    document: Arc<SharedDocument>,
}

impl<G: TextGenerator + 'static> VerifyToolingUseCase<G> {
    pub fn new(service: GenerationService<G>, document: Arc<SharedDocument>) -> Self {
        Self { service, document }
    }

    pub async fn execute(&self, progress: &dyn ConversationNotifier) -> bool {
        let snapshot = self.document.snapshot();
        let passed = self.run(progress).await;
        self.document.restore(snapshot);

        if passed {
            info!("Tooling verification passed");
        } else {
            warn!("Tooling verification failed");
        }
        passed
    }

    async fn run(&self, progress: &dyn ConversationNotifier) -> bool {
        let request = GenerationRequest::new(
            PromptTemplate::verification_system(),
            PromptTemplate::verification(),
        );
        let reply = match self
            .service
            .generate("Tooling verification", &request, progress)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Tooling verification request failed");
                return false;
            }
        };

        ToolCallBridge::new(self.document.clone()).apply_fallback_commands(&reply);

        let content = self.document.content();
        content.contains(EXPECTED_TITLE)
            && content.contains(EXPECTED_SECTION)
            && contains_ignore_case(&content, EXPECTED_PARAGRAPH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoConversationProgress;
    use crate::testing::MockGenerator;

    const GOOD_REPLY: &str = r#"```tool
[
  {"tool": "markdown.SetTitle", "args": {"title": "Verification Title"}},
  {"tool": "markdown.AddHeading", "args": {"text": "Verification Section", "level": 2}},
  {"tool": "markdown.AppendParagraph", "args": {"text": "This is a Verification Paragraph."}}
]
```"#;

    fn verifier(reply: &str, doc: &Arc<SharedDocument>) -> VerifyToolingUseCase<MockGenerator> {
        let generator = Arc::new(MockGenerator::with_replies([reply]));
        VerifyToolingUseCase::new(GenerationService::unmetered(generator), doc.clone())
    }

    #[tokio::test]
    async fn test_passes_and_restores_document() {
        let doc = Arc::new(SharedDocument::from_markdown("# Existing\n\nKeep me.\n\n"));
        let before = doc.content();

        assert!(verifier(GOOD_REPLY, &doc).execute(&NoConversationProgress).await);
        assert_eq!(doc.content(), before);
    }

    #[tokio::test]
    async fn test_fails_without_tool_output_and_restores() {
        let doc = Arc::new(SharedDocument::new());

        let passed = verifier("I cannot use tools.", &doc)
            .execute(&NoConversationProgress)
            .await;

        assert!(!passed);
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn test_partial_edits_fail() {
        let doc = Arc::new(SharedDocument::new());
        let reply =
            "```tool\n{\"tool\":\"markdown.SetTitle\",\"args\":{\"title\":\"Verification Title\"}}\n```";

        assert!(!verifier(reply, &doc).execute(&NoConversationProgress).await);
        assert!(doc.is_empty());
    }
}
