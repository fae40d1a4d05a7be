//! Human-in-the-Loop handling for the RunConversation use case.

use super::RunConversationUseCase;
use super::types::RunConversationInput;
use crate::ports::generator::TextGenerator;
use crate::ports::human_intervention::{Directive, HumanInterventionError};
use crate::ports::progress::ConversationNotifier;
use roundtable_domain::{Session, TerminationReason};
use tracing::{info, warn};

impl<G: TextGenerator + 'static> RunConversationUseCase<G> {
    /// Ask the director what to do after a turn. Returns `true` when the
    /// session should stop.
    pub(super) async fn consult_director(
        &self,
        input: &RunConversationInput,
        session: &mut Session,
        progress: &dyn ConversationNotifier,
    ) -> bool {
        if !input.params.interactive {
            return false;
        }
        let Some(director) = &self.director else {
            warn!("Interactive mode without a director, continuing");
            return false;
        };

        match director.request_directive(session).await {
            Ok(Directive::Continue) => false,
            Ok(Directive::Inject(text)) => {
                let turn = session.inject_director(text);
                progress.on_turn_complete(turn);
                self.log_turn(turn);
                false
            }
            Ok(Directive::Quit) => {
                info!("Director ended the conversation");
                session.terminate(TerminationReason::DirectorQuit);
                true
            }
            Err(HumanInterventionError::Cancelled) => {
                session.terminate(TerminationReason::Cancelled);
                true
            }
            Err(e) => {
                warn!(error = %e, "Director input failed, continuing");
                false
            }
        }
    }
}
