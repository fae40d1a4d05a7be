//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_conversation;
pub mod select_speaker;
pub mod side_passes;
pub(crate) mod shared;
pub mod tool_bridge;
pub mod verify_tooling;

pub use shared::{GenerationService, TurnError};
