//! Application-level configuration.
//!
//! - [`ConversationParams`]: turn scheduler loop control

pub mod conversation_params;

pub use conversation_params::ConversationParams;
