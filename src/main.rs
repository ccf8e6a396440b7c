// TeamTacles - command-line client for the TeamTacles project management API
//
// Architecture:
// - api: reqwest transport, bearer session with unauthorized observers, page envelopes
// - collection: generic paginated controller driven by a PageSource per endpoint
// - domain: projects, tasks, teams and team members (records, sources, mutations)
// - cli/commands/browse: clap front end, one-shot listings and an interactive browser
// - demo: in-process axum mock of the API for `--demo` and tests

mod api;
mod browse;
mod cli;
mod collection;
mod commands;
mod config;
mod demo;
mod domain;
mod filters;
mod util;

use anyhow::Result;
use clap::Parser;
use config::{Config, LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing: stderr output plus optional JSON log files
///
/// Precedence: RUST_LOG env var > config file > default "warn".
/// The returned guard must be kept alive so file logs flush on exit.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let default_filter = format!("teamtacles={}", logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !logging.file_enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    let file_appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    };

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // config --show/--reset/--path exit before anything else loads
    if cli::handle_config_command(&cli.command) {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    let _file_guard = init_logging(&config.logging);
    tracing::debug!(
        "teamtacles {} using {}{}",
        config::VERSION,
        config.api_url,
        if cli.demo { " (demo)" } else { "" }
    );

    commands::run(cli, config).await
}
