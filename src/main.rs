//! TabGrouper - AI-assisted browser tab grouping
//!
//! Developer CLI around the grouping engine.

mod cli;
mod cmd_inspect;
mod cmd_simulate;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tabgrouper_config::{Config, ConfigLoader};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console output and optional daily-rotated files.
fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("tabgrouper")
                .filename_suffix("log")
                .max_log_files(14)
                .build(dir)
                .context("Failed to create log file appender")?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes on drop; keep it for the life of the process.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    ConfigLoader::load_or_default(path).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_dir.as_deref())?;

    match cli.command {
        Commands::Classify { url, title } => cmd_inspect::classify(&url, &title),
        Commands::Providers => cmd_inspect::providers(),
        Commands::ProbeEnv { provider } => cmd_inspect::probe_env(&provider),
        Commands::CheckConfig => cmd_inspect::check_config(cli.config.as_deref()),
        Commands::Suggest { urls } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_simulate::suggest(&config, &urls).await
        }
        Commands::Simulate { urls, mode, accept } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_simulate::simulate(&config, &urls, mode, accept).await
        }
    }
}
