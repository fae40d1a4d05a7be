//! Console narration of a running conversation

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use roundtable_application::ConversationNotifier;
use roundtable_domain::{ConversationMode, Participant, TerminationReason, Turn, TurnKind};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Prints each turn as it lands, with a spinner while a participant generates
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
    hidden: bool,
    show_preview: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            hidden: false,
            show_preview: true,
        }
    }

    /// Reporter whose spinners never draw (for tests and non-tty output)
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    pub fn with_document_preview(mut self, show: bool) -> Self {
        self.show_preview = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .expect("spinner template is valid")
    }

    fn start_spinner(&self, prefix: String, message: &'static str) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(message);
        if !self.hidden {
            pb.enable_steady_tick(SPINNER_TICK);
        }
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(pb);
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing an active spinner
    fn print(&self, line: String) {
        match self.spinner.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(pb) => pb.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn format_session_header(
    topic: &str,
    participants: &[Participant],
    mode: ConversationMode,
) -> String {
    let names: Vec<&str> = participants.iter().map(|p| p.name.as_str()).collect();
    format!(
        "{} {}\n{} {}\n{} {}\n",
        "Topic:".cyan().bold(),
        topic,
        "Participants:".cyan().bold(),
        names.join(", "),
        "Mode:".cyan().bold(),
        mode.short_description()
    )
}

pub(crate) fn format_turn(turn: &Turn) -> String {
    let header = match turn.kind {
        TurnKind::Participant => format!("── {} ──", turn.speaker).yellow().bold(),
        TurnKind::Director => "── Director ──".magenta().bold(),
    };
    format!("\n{}\n{}\n", header, turn.output.trim())
}

pub(crate) fn format_wait(wait: Duration) -> String {
    let secs = wait.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

impl ConversationNotifier for ConsoleReporter {
    fn on_session_start(&self, topic: &str, participants: &[Participant], mode: ConversationMode) {
        self.print(format_session_header(topic, participants, mode));
    }

    fn on_speaker_selected(&self, name: &str, reason: Option<&str>) {
        let line = match reason {
            Some(reason) => format!("{} {} ({})", "→".cyan(), name.bold(), reason.dimmed()),
            None => format!("{} {}", "→".cyan(), name.bold()),
        };
        self.print(line);
    }

    fn on_selector_concluded(&self, reason: Option<&str>) {
        let line = match reason {
            Some(reason) => format!("{} Moderator concluded: {}", "■".cyan(), reason),
            None => format!("{} Moderator named no participant", "■".yellow()),
        };
        self.print(line);
    }

    fn on_turn_start(&self, name: &str) {
        self.start_spinner(name.to_string(), "is thinking...");
    }

    fn on_turn_complete(&self, turn: &Turn) {
        self.clear_spinner();
        self.print(format_turn(turn));
    }

    fn on_turn_failed(&self, name: &str, error: &str) {
        self.clear_spinner();
        self.print(format!("{} {} failed: {}", "x".red(), name.bold(), error));
    }

    fn on_document_preview(&self, preview: &str) {
        if self.show_preview && !preview.trim().is_empty() {
            self.print(format!("{}\n{}", "Document outline:".dimmed(), preview.dimmed()));
        }
    }

    fn on_editor_review(&self, reply: &str) {
        self.print(format!("\n{}\n{}\n", "── Editor ──".blue().bold(), reply.trim()));
    }

    fn on_side_pass_skipped(&self, pass: &str, reason: &str) {
        self.print(format!("  {} {} skipped: {}", "-".dimmed(), pass, reason.dimmed()));
    }

    fn on_fact_check_flag(&self, flag: &str) {
        self.print(format!("{} {}", "Fact check:".yellow().bold(), flag));
    }

    fn on_history_compacted(&self, summarized: bool) {
        let how = if summarized { "summarized" } else { "trimmed" };
        self.print(format!("  {} older history {}", "~".dimmed(), how));
    }

    fn on_data_extracted(&self, path: &Path) {
        self.print(format!("{} Structured data written to {}", "v".green(), path.display()));
    }

    fn on_retry(&self, label: &str, attempt: u32, max_retries: u32, wait: Duration) {
        self.print(format!(
            "  {} {} rate limited, retry {}/{} in {}",
            "!".yellow(),
            label,
            attempt,
            max_retries,
            format_wait(wait)
        ));
    }

    fn on_throttle_wait(&self, wait: Duration) {
        self.print(format!(
            "  {} rate window full, waiting {}",
            "!".yellow(),
            format_wait(wait)
        ));
    }

    fn on_saved(&self, path: &Path) {
        self.print(format!("{} Document saved to {}", "v".green(), path.display()));
    }

    fn on_save_failed(&self, error: &str) {
        self.print(format!("{} Could not save document: {}", "x".red(), error));
    }

    fn on_session_end(&self, reason: TerminationReason, turns: usize) {
        self.clear_spinner();
        let line = format!("Conversation ended: {} after {} turn(s)", reason, turns);
        let line = match reason {
            TerminationReason::Cancelled | TerminationReason::NoSelectableSpeaker => {
                line.yellow().bold()
            }
            _ => line.green().bold(),
        };
        println!("\n{}", line);
    }
}
