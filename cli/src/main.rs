//! CLI entrypoint for clinichat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use clinichat_application::{ChatSession, ConversationLogger, NoConversationLogger, SessionCommand};
use clinichat_domain::DispatchPolicy;
use clinichat_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, ResponderKind, Severity, build_responder,
};
use clinichat_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig, ResponderChoice};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.log_dir.as_ref().map(PathBuf::from));
    let _guard = init_tracing(cli.verbose, log_dir.as_deref());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let result = runtime.block_on(run(cli, config));
    // A pending stdin read holds a blocking thread until the next line
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Initialize logging based on verbosity level.
///
/// Logs go to stderr, or to a daily-rotated file under `log_dir`.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "clinichat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

async fn run(cli: Cli, config: FileConfig) -> Result<()> {
    info!("Starting clinichat");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => eprintln!("config error: {}", issue.message),
            Severity::Warning => warn!("{}", issue.message),
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Configuration is invalid; run with --show-config to see which files were loaded");
    }

    // === Dependency Injection ===
    let kind = match cli.responder {
        Some(ResponderChoice::Echo) => ResponderKind::Echo,
        Some(ResponderChoice::Gemini) => ResponderKind::Gemini,
        None => config.responder.parse_kind().0,
    };
    let responder =
        build_responder(kind, &config.responder).context("Failed to create responder")?;

    let mut session_config = config.to_session_config();
    if let Some(policy) = cli.policy {
        session_config = session_config.with_dispatch_policy(DispatchPolicy::from(policy));
    }
    if cli.no_greeting {
        session_config = session_config.without_greeting();
    }
    let policy = session_config.dispatch_policy;

    let conversation_logger: Arc<dyn ConversationLogger> = match cli
        .log_conversation
        .clone()
        .or_else(|| config.logging.conversation_log.as_ref().map(PathBuf::from))
    {
        Some(path) => match JsonlConversationLogger::open(&path) {
            Ok(logger) => {
                info!("Conversation log: {}", logger.path().display());
                Arc::new(logger)
            }
            Err(e) => {
                warn!("Conversation log {} disabled: {}", path.display(), e);
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };

    let shutdown = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let session = ChatSession::new(Arc::clone(&responder), session_config)
        .with_cancellation(&shutdown)
        .with_event_sender(event_tx)
        .with_conversation_logger(conversation_logger);

    let mut repl = ChatRepl::new(cmd_tx.clone(), event_rx)
        .with_config(
            ReplConfig::default()
                .with_progress(!cli.quiet)
                .with_color(!cli.no_color),
        )
        .with_transcript(session.snapshot());

    print!(
        "{}",
        ConsoleFormatter::welcome(responder.name(), policy.description())
    );

    let session_task = tokio::spawn(session.run(cmd_rx));

    // Ctrl-C ends the session the same way /quit does
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cmd_tx.send(SessionCommand::Destroy);
        }
    });

    let repl_result = repl.run_stdin().await;

    shutdown.cancel();
    session_task.await.context("Chat session task failed")?;
    repl_result.context("Failed to read input")?;

    info!("clinichat finished");
    Ok(())
}
