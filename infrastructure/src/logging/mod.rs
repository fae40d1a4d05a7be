//! Structured conversation transcripts.
//!
//! [`JsonlTranscriptLogger`] implements the
//! [`ConversationLogger`](roundtable_application::ConversationLogger) port.

mod jsonl_transcript;

pub use jsonl_transcript::JsonlTranscriptLogger;
