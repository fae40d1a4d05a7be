//! Shared markdown document edited by all participants.

pub mod heading;
pub mod shared;

pub use heading::Heading;
pub use shared::{DEFAULT_DOCUMENT_PATH, DocumentSnapshot, SharedDocument};
