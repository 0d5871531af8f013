//! Homework bot CLI
//!
//! Main entry point: polls the homework review API and relays status
//! changes to a Telegram chat.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use homework_poller::{Config, Credentials, Cursor, CycleOutcome, PollCycle, Scheduler};
use homework_transport::{http_client, PracticumClient, TelegramNotifier};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Homework bot - review status notifications
///
/// Polls the homework review API at a fixed period and sends a Telegram
/// message whenever the status of the latest submission changes.
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: homework-bot.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file path (overrides the config file; empty disables file logging)
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Credentials may live in a .env file next to the binary's working dir.
    dotenvy::dotenv().ok();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };
    if let Some(log_file) = args.log_file.clone() {
        config.log_file = log_file;
    }

    let _guard = init_tracing(args.verbose, config.log_file());

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(severity = "critical", error = %e, "Missing credentials, stopping");
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match run(args.once, &config, credentials).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Homework bot stopped");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Builds the transport and runs the poll loop until Ctrl+C.
async fn run(once: bool, config: &Config, credentials: Credentials) -> anyhow::Result<()> {
    let http = http_client()?;
    let api = PracticumClient::with_client(
        http.clone(),
        &config.endpoint,
        credentials.practicum_token,
    );
    let notifier = TelegramNotifier::with_client(
        http,
        &config.telegram_api_url,
        credentials.telegram_token,
        credentials.telegram_chat_id,
    );

    let cursor = Cursor::starting_now().advancing(config.advance_cursor);
    tracing::info!(
        endpoint = %config.endpoint,
        from_date = cursor.from_date(),
        retry_period_secs = config.retry_period_secs,
        advance_cursor = config.advance_cursor,
        "Homework bot starting"
    );

    let mut cycle = PollCycle::new(api, notifier, cursor);

    if once {
        let outcome = cycle.run().await;
        print_outcome(&outcome);
        return Ok(());
    }

    let mut scheduler = Scheduler::new(cycle, config.retry_period());
    let cycles = scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!(cycles, "Homework bot stopped");
    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Ok(Config::load_from_file(path)?)
        }
        None => Ok(Config::load()?),
    }
}

/// Initializes logging to stdout and, if configured, to a log file.
///
/// Priority for the filter: `RUST_LOG` env var > `--verbose` flag > info.
/// The returned guard flushes the file writer on drop.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let appender = log_file.and_then(|path| match file_appender(path) {
        Ok(appender) => Some(appender),
        Err(e) => {
            // The subscriber is not up yet; stderr is all there is.
            eprintln!("Warning: cannot open log file '{}': {e}", path.display());
            None
        }
    });
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();

    guard
}

/// Opens `path` for appending, without rotation.
fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

/// Prints the result of a single `--once` cycle.
fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Unchanged => println!("No status change"),
        CycleOutcome::Delivered(message) => println!("Sent: {message}"),
        CycleOutcome::Failed { failure, reported } => {
            let note = if *reported { "reported" } else { "not reported" };
            println!("Cycle failed ({}, {note}): {failure}", failure.kind());
        }
    }
}
