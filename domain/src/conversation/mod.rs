//! Conversation entities: participants, turns, and the session they form.

pub mod completion;
pub mod mode;
pub mod participant;
pub mod session;
pub mod turn;

pub use completion::{
    COMPLETION_PHRASES, contains_completion_phrase, is_conversation_complete,
    min_turns_before_conclusion,
};
pub use mode::ConversationMode;
pub use participant::{Participant, validate_roster};
pub use session::{HISTORY_TRIMMED_MARKER, SUMMARY_PREFIX, Session, TerminationReason};
pub use turn::{Turn, TurnKind};
