//! Test doubles shared by the use case tests.

use crate::ports::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use async_trait::async_trait;
use roundtable_domain::{TerminationReason, Turn};
use std::collections::VecDeque;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync>;

/// Generator that replays scripted replies, then falls back to a responder.
pub struct MockGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results(results: impl IntoIterator<Item = Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(results.into_iter().collect()),
            responder: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request by calling `responder`.
    pub fn with_responder(
        responder: impl Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            responder: Some(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Err(GenerationError::RequestFailed(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

/// Progress notifier that records what it was told.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ConversationNotifier for RecordingNotifier {
    fn on_speaker_selected(&self, name: &str, _reason: Option<&str>) {
        self.push(format!("selected:{name}"));
    }

    fn on_turn_complete(&self, turn: &Turn) {
        self.push(format!("turn:{}", turn.speaker));
    }

    fn on_turn_failed(&self, name: &str, error: &str) {
        self.push(format!("failed:{name}:{error}"));
    }

    fn on_editor_review(&self, _reply: &str) {
        self.push("editor".to_string());
    }

    fn on_side_pass_skipped(&self, pass: &str, reason: &str) {
        self.push(format!("skipped:{pass}:{reason}"));
    }

    fn on_fact_check_flag(&self, flag: &str) {
        self.push(format!("flag:{flag}"));
    }

    fn on_history_compacted(&self, summarized: bool) {
        self.push(format!("compacted:{summarized}"));
    }

    fn on_save_failed(&self, error: &str) {
        self.push(format!("save_failed:{error}"));
    }

    fn on_session_end(&self, reason: TerminationReason, turns: usize) {
        self.push(format!("end:{reason:?}:{turns}"));
    }
}
