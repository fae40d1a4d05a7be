//! Terminal director for interactive conversations.
//!
//! After every turn the user sees:
//!
//! ```text
//! [turn 3/10] Enter = continue, text = inject, /quit = stop
//! director>
//! ```

use async_trait::async_trait;
use colored::Colorize;
use roundtable_application::{Directive, DirectorPort, HumanInterventionError};
use roundtable_domain::Session;
use std::io::{self, BufRead, Write};

/// Reads director input from stdin.
pub struct StdinDirector {
    max_turns: Option<usize>,
}

impl StdinDirector {
    pub fn new() -> Self {
        Self { max_turns: None }
    }

    /// Show the turn budget in the prompt
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    fn prompt_line(&self, session: &Session) -> String {
        let progress = match self.max_turns {
            Some(max) => format!("[turn {}/{}]", session.attempted_turns(), max),
            None => format!("[turn {}]", session.attempted_turns()),
        };
        format!(
            "{} Enter = continue, text = inject, {} = stop",
            progress.dimmed(),
            "/quit".red()
        )
    }
}

impl Default for StdinDirector {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one directive. End of input counts as cancellation.
pub(crate) fn read_directive(reader: &mut impl BufRead) -> Result<Directive, HumanInterventionError> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .map_err(|e| HumanInterventionError::IoError(format!("Failed to read input: {}", e)))?;
    if read == 0 {
        return Err(HumanInterventionError::Cancelled);
    }
    Ok(Directive::from_input(&input))
}

#[async_trait]
impl DirectorPort for StdinDirector {
    async fn request_directive(&self, session: &Session) -> Result<Directive, HumanInterventionError> {
        println!("{}", self.prompt_line(session));
        print!("{} ", "director>".magenta().bold());
        io::stdout().flush().map_err(|e| {
            HumanInterventionError::IoError(format!("Failed to flush stdout: {}", e))
        })?;

        tokio::task::spawn_blocking(|| read_directive(&mut io::stdin().lock()))
            .await
            .map_err(|e| HumanInterventionError::IoError(format!("Input task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::ConversationMode;
    use std::io::Cursor;

    #[test]
    fn test_read_directive() {
        let mut input = Cursor::new("\nfocus on cost\n/quit\n");
        assert_eq!(read_directive(&mut input), Ok(Directive::Continue));
        assert_eq!(
            read_directive(&mut input),
            Ok(Directive::Inject("focus on cost".to_string()))
        );
        assert_eq!(read_directive(&mut input), Ok(Directive::Quit));
        assert_eq!(
            read_directive(&mut input),
            Err(HumanInterventionError::Cancelled)
        );
    }

    #[test]
    fn test_prompt_line_shows_budget() {
        let session = Session::new("topic", ConversationMode::RoundRobin);
        let line = StdinDirector::new().with_max_turns(10).prompt_line(&session);
        assert!(line.contains("/10]"));
        assert!(line.contains("/quit"));
    }
}
