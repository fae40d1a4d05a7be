//! Presentation layer for roundtable
//!
//! This crate contains the CLI definition, the console progress reporter,
//! the interactive stdin director, and the outcome formatter.

pub mod cli;
pub mod director;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, ModeArg, OutputFormat};
pub use director::stdin::StdinDirector;
pub use output::console::OutcomeFormatter;
pub use progress::reporter::ConsoleReporter;
