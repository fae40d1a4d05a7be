//! Director port for interactive conversations.
//!
//! In interactive mode the human "director" gets a say after every turn:
//! keep going, inject a message, or end the session.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`DirectorPort`] - defined here in application layer
//! - **Adapter**: `StdinDirector` - implemented in presentation layer
//!
//! # Flow
//!
//! ```text
//! Turn N recorded
//!        ↓
//! DirectorPort::request_directive()
//!        ↓
//! Continue / Inject("focus on cost") / Quit
//! ```
//!
//! # Built-in Implementations
//!
//! - [`NoDirector`] - Always returns [`Directive::Continue`]

use async_trait::async_trait;
use roundtable_domain::Session;
use thiserror::Error;

/// Error type for director interaction.
///
/// These errors represent failures while asking, not decisions made by the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HumanInterventionError {
    /// User cancelled the prompt (e.g., via Ctrl+C or EOF).
    #[error("Operation cancelled")]
    Cancelled,
    /// Input/output error (e.g., terminal read failure).
    #[error("I/O error: {0}")]
    IoError(String),
}

/// What the director wants after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Continue,
    /// Add a director message; it becomes the current message
    Inject(String),
    Quit,
}

impl Directive {
    /// Interpret one line of director input.
    ///
    /// Empty input continues, `/quit` (or `/q`, `/exit`) ends the session,
    /// anything else is injected.
    pub fn from_input(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Directive::Continue,
            "/quit" | "/q" | "/exit" => Directive::Quit,
            _ => Directive::Inject(trimmed.to_string()),
        }
    }
}

/// Port for asking the human director what to do next.
#[async_trait]
pub trait DirectorPort: Send + Sync {
    /// Ask for a directive after a turn. `session` is read-only context.
    async fn request_directive(&self, session: &Session) -> Result<Directive, HumanInterventionError>;
}

/// Non-interactive director: never intervenes.
pub struct NoDirector;

#[async_trait]
impl DirectorPort for NoDirector {
    async fn request_directive(&self, _session: &Session) -> Result<Directive, HumanInterventionError> {
        Ok(Directive::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::ConversationMode;

    #[tokio::test]
    async fn test_no_director_continues() {
        let session = Session::new("t", ConversationMode::RoundRobin);
        let directive = NoDirector.request_directive(&session).await.unwrap();
        assert_eq!(directive, Directive::Continue);
    }

    #[test]
    fn test_directive_from_input() {
        assert_eq!(Directive::from_input("  \n"), Directive::Continue);
        assert_eq!(Directive::from_input("/QUIT"), Directive::Quit);
        assert_eq!(Directive::from_input("/q"), Directive::Quit);
        assert_eq!(
            Directive::from_input(" focus on cost \n"),
            Directive::Inject("focus on cost".to_string())
        );
    }
}
