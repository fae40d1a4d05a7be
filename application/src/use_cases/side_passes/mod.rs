//! Secondary generation passes that run around participant turns.
//!
//! Every pass goes through the session's [`GenerationService`], so it is
//! throttled and retried like any participant call. None of them can fail
//! a session.
//!
//! [`GenerationService`]: crate::use_cases::GenerationService

pub mod editor;
pub mod extract;
pub mod fact_check;
pub mod summarize;

pub use editor::{EditorOutcome, EditorReviewer};
pub use extract::{DataExtractor, ExtractionError, clean_json};
pub use fact_check::{FactCheckOutcome, FactChecker};
pub use summarize::{CompactionOutcome, ContextSummarizer, SUMMARIZE_THRESHOLD};
