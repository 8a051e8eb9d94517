/*
[INPUT]:  CLI arguments, YAML configuration file, SEARCHWATCH__* environment
[OUTPUT]: Task management commands against the monitoring API
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or logging setup
[UPDATE]: 2026-09-28 Print command failures instead of returning them from main
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use cli::Command;
use searchwatch_console::config::ConsoleConfig;

const LOG_FILE_PREFIX: &str = "searchwatch.log";

#[derive(Parser, Debug)]
#[command(name = "searchwatch", version, about = "Manage AI search monitoring tasks")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides logging.level from the config file
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    /// Load and validate configuration, then exit
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    if let Some(Command::Init { output }) = &args.command {
        init_tracing(args.log_level.as_deref().unwrap_or("warn"), None)?;
        return cli::init::run_init(output.clone());
    }

    let config = ConsoleConfig::load(args.config_path.as_deref()).context("load config")?;
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let _guard = init_tracing(level, config.logging.directory.as_deref())?;

    info!(
        config_path = ?args.config_path,
        base_url = %config.api.base_url,
        has_api_key = config.api_key().is_some(),
        poll_interval_ms = config.preview.poll_interval_ms,
        max_attempts = config.preview.max_attempts,
        dry_run = args.dry_run,
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let command = args.command.unwrap_or(Command::List {
        status: None,
        search: None,
        sort: Default::default(),
    });
    cli::execute(command, &config).await
}

/// Stderr logging, plus a daily rolling file when `directory` is set. The
/// returned guard flushes the file writer and must outlive the command.
fn init_tracing(log_level: &str, directory: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file, guard) = match directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("create log directory {}", directory.display()))?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}
