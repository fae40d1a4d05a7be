//! Fact checking of participant messages.

use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::shared::GenerationService;
use roundtable_domain::PromptTemplate;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Messages shorter than this are not worth checking.
const MIN_CHECKED_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactCheckOutcome {
    /// Too short to check
    Skipped,
    Passed,
    /// The checker's reply, starting with `FLAG:` by convention
    Flagged(String),
    /// The check itself failed; never surfaced as an error
    Failed(String),
}

pub struct FactChecker<G: TextGenerator + 'static> {
    service: GenerationService<G>,
}

impl<G: TextGenerator + 'static> FactChecker<G> {
    pub fn new(service: GenerationService<G>) -> Self {
        Self { service }
    }

    /// Check one message. Any reply not starting with `PASS` is a flag.
    pub async fn check(
        &self,
        message: &str,
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> FactCheckOutcome {
        if message.chars().count() < MIN_CHECKED_CHARS {
            return FactCheckOutcome::Skipped;
        }

        let request = GenerationRequest::new(
            PromptTemplate::fact_check_system(),
            PromptTemplate::fact_check(message),
        );
        match self
            .service
            .generate_metered("Fact check", &request, cancel, progress)
            .await
        {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.to_uppercase().starts_with("PASS") {
                    FactCheckOutcome::Passed
                } else {
                    FactCheckOutcome::Flagged(reply.to_string())
                }
            }
            Err(e) => {
                debug!(error = %e, "Fact check failed");
                FactCheckOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoConversationProgress;
    use crate::testing::MockGenerator;
    use std::sync::Arc;

    fn checker(generator: &Arc<MockGenerator>) -> FactChecker<MockGenerator> {
        FactChecker::new(GenerationService::unmetered(generator.clone()))
    }

    #[tokio::test]
    async fn test_short_messages_are_skipped() {
        let generator = Arc::new(MockGenerator::with_replies(["FLAG: nope"]));
        let outcome = checker(&generator)
            .check("I agree.", None, &NoConversationProgress)
            .await;
        assert_eq!(outcome, FactCheckOutcome::Skipped);
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_pass_and_flag() {
        let generator = Arc::new(MockGenerator::with_replies([
            "  pass",
            "FLAG: Rust 1.0 shipped in 2015, not 2012.",
        ]));
        let checker = checker(&generator);
        let message = "Rust 1.0 shipped in 2012 and has been stable since.";

        assert_eq!(
            checker.check(message, None, &NoConversationProgress).await,
            FactCheckOutcome::Passed
        );
        assert_eq!(
            checker.check(message, None, &NoConversationProgress).await,
            FactCheckOutcome::Flagged("FLAG: Rust 1.0 shipped in 2015, not 2012.".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let generator = Arc::new(MockGenerator::with_replies(Vec::<String>::new()));
        let outcome = checker(&generator)
            .check(
                "A sufficiently long message to check.",
                None,
                &NoConversationProgress,
            )
            .await;
        assert!(matches!(outcome, FactCheckOutcome::Failed(_)));
    }
}
