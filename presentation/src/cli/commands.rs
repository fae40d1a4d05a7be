//! CLI command definitions

use clap::{Parser, ValueEnum};
use roundtable_domain::ConversationMode;
use std::path::PathBuf;

/// Scheduling mode as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Participants speak in configured order
    RoundRobin,
    /// A moderator picks each speaker
    Directed,
}

impl From<ModeArg> for ConversationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::RoundRobin => ConversationMode::RoundRobin,
            ModeArg::Directed => ConversationMode::Directed,
        }
    }
}

/// How the final outcome is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary and the final document
    #[default]
    Text,
    /// Only the summary, without the document
    Summary,
    /// JSON report including every turn
    Json,
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Turn-based multi-agent discussion over a shared markdown document")]
#[command(long_about = r#"
Roundtable runs a discussion between configured participants. Each turn,
one participant reads the shared document and the recent conversation,
replies, and may edit the document through fallback tool blocks.

Speaker order is either round-robin or directed by a moderator.
With --interactive you act as the director after every turn:
press Enter to continue, type a message to inject it, or /quit to stop.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_<SECTION>__<KEY> environment variables
2. --config <path>         Explicit config file
3. ./roundtable.toml       Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "Design a caching layer for our API"
  roundtable --mode directed --max-turns 6 -i "Plan the Q3 roadmap"
"#)]
pub struct Cli {
    /// Discussion topic (not required with --show-config)
    pub topic: Option<String>,

    /// Speaker scheduling mode (overrides conversation.mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Turn budget: rounds in round-robin, total turns in directed mode
    #[arg(short = 't', long, value_name = "N")]
    pub max_turns: Option<usize>,

    /// Act as the director between turns
    #[arg(short, long)]
    pub interactive: bool,

    /// Where to save the final document (overrides conversation.output_path)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write a JSONL transcript of conversation events
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Final report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Tracing filter directive for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
