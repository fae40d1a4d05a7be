//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use roundtable_application::{
    ConversationNotifier, DataExtractor, EditorReviewer, FactChecker, GenerationService,
    NoConversationProgress, RateLimiter, RetryExecutor, RunConversationInput,
    RunConversationUseCase, SpeakerSelector, VerifyToolingUseCase,
};
use roundtable_domain::{ConversationMode, SharedDocument};
use roundtable_infrastructure::{ConfigLoader, FileConfig, JsonlTranscriptLogger, OpenAiGenerator};
use roundtable_presentation::{
    Cli, ConsoleReporter, OutcomeFormatter, OutputFormat, StdinDirector,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&cli)?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let topic = match cli.topic.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => bail!("A discussion topic is required."),
    };

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    info!("Starting roundtable");

    let participants = config.participants();
    if participants.is_empty() {
        bail!("No participants configured. Add [[participants]] entries to roundtable.toml.");
    }
    let mode = config
        .conversation
        .parse_mode()
        .unwrap_or_default();
    let params = config.conversation_params();

    // === Dependency Injection ===
    let generator = Arc::new(
        OpenAiGenerator::from_config(&config.provider)
            .context("Failed to create the text generator")?,
    );
    let service = GenerationService::new(
        generator,
        Arc::new(RateLimiter::new(config.rate_limit.clone())),
        RetryExecutor::new(config.retry.clone()),
    );
    let document = Arc::new(SharedDocument::new());

    let quiet = cli.quiet || cli.format == OutputFormat::Json;
    let reporter: Box<dyn ConversationNotifier> = if quiet {
        Box::new(NoConversationProgress)
    } else {
        Box::new(ConsoleReporter::new().with_document_preview(params.show_document_preview))
    };

    if config.tools.require_tools_verification {
        let verified = VerifyToolingUseCase::new(service.clone(), document.clone())
            .execute(reporter.as_ref())
            .await;
        if !verified {
            bail!("Tool verification failed and tools.require_tools_verification is set.");
        }
        info!("Tool verification passed");
    }

    let cancellation = CancellationToken::new();
    let mut use_case = RunConversationUseCase::new(service.clone(), document.clone())
        .with_cancellation(cancellation.clone());

    if mode == ConversationMode::Directed {
        use_case = use_case.with_selector(SpeakerSelector::new(
            service.clone(),
            document.clone(),
            participants.clone(),
            config.orchestrator.base_system_prompt.as_deref(),
        ));
    }
    if config.editor.enabled {
        use_case = use_case.with_editor(EditorReviewer::new(
            service.clone(),
            document.clone(),
            config.editor.system_prompt.as_deref(),
        ));
    }
    if config.fact_check.enabled {
        use_case = use_case.with_fact_checker(FactChecker::new(service.clone()));
    }
    if config.structured_data.enabled {
        use_case = use_case.with_extractor(DataExtractor::new(
            service.clone(),
            document.clone(),
            config.structured_data.schema_description.clone(),
            config.structured_data.output_file.clone(),
        ));
    }
    if params.interactive {
        use_case =
            use_case.with_director(Arc::new(StdinDirector::new().with_max_turns(params.max_turns)));
    }
    if let Some(path) = &config.logging.transcript_path {
        match JsonlTranscriptLogger::create(path) {
            Ok(logger) => use_case = use_case.with_logger(Arc::new(logger)),
            Err(e) => warn!(path = %path, error = %e, "Transcript disabled"),
        }
    }

    // Ctrl+C stops after the in-flight call; the document is still saved
    let token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current step");
            token.cancel();
        }
    });

    let input = RunConversationInput::new(topic, participants, mode).with_params(params);
    let outcome = use_case
        .execute_with_progress(input, reporter.as_ref())
        .await?;

    let content = document.content();
    let output = match cli.format {
        OutputFormat::Text => OutcomeFormatter::format(&outcome, &content),
        OutputFormat::Summary => OutcomeFormatter::format_summary(&outcome),
        OutputFormat::Json => OutcomeFormatter::format_json(&outcome, &content),
    };
    println!("{}", output);

    Ok(())
}

/// Install the tracing subscriber; the guard must outlive `main`'s work.
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(cli.log_level());

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Command-line flags win over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.conversation.mode = ConversationMode::from(mode).to_string();
    }
    if let Some(max_turns) = cli.max_turns {
        config.conversation.max_turns = max_turns;
    }
    if cli.interactive {
        config.conversation.interactive = true;
    }
    if let Some(output) = &cli.output {
        config.conversation.output_path = output.display().to_string();
    }
    if let Some(transcript) = &cli.transcript {
        config.logging.transcript_path = Some(transcript.display().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "roundtable",
            "--mode",
            "directed",
            "--max-turns",
            "3",
            "--interactive",
            "--output",
            "plan.md",
            "--transcript",
            "talk.jsonl",
            "topic",
        ])
        .unwrap();
        let mut config = FileConfig::default();

        apply_overrides(&mut config, &cli);

        assert_eq!(config.conversation.parse_mode(), Some(ConversationMode::Directed));
        assert_eq!(config.conversation.max_turns, 3);
        assert!(config.conversation.interactive);
        assert_eq!(config.conversation.output_path, "plan.md");
        assert_eq!(config.logging.transcript_path.as_deref(), Some("talk.jsonl"));
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["roundtable", "topic"]).unwrap();
        let mut config = FileConfig::default();
        config.conversation.max_turns = 7;
        config.conversation.interactive = true;

        apply_overrides(&mut config, &cli);

        assert_eq!(config.conversation.max_turns, 7);
        assert!(config.conversation.interactive);
        assert_eq!(config.conversation.mode, "round_robin");
        assert!(config.logging.transcript_path.is_none());
    }

    #[test]
    fn test_zero_turn_override_fails_validation() {
        let cli = Cli::try_parse_from(["roundtable", "-t", "0", "topic"]).unwrap();
        let mut config = FileConfig::default();
        apply_overrides(&mut config, &cli);
        assert!(config.validate().is_err());
    }
}
