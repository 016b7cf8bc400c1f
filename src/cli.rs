//! CLI definitions for TabGrouper.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tabgrouper_protocols::GroupingMode;

/// TabGrouper CLI.
#[derive(Parser)]
#[command(name = "tabgrouper")]
#[command(about = "AI-assisted browser tab grouping engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: <config dir>/tabgrouper/config.toml)
    #[arg(short, long, global = true, env = "TABGROUPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Also write daily-rotated log files to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Classify a URL with the built-in rules
    Classify {
        #[arg(long)]
        url: String,

        #[arg(long, default_value = "")]
        title: String,
    },

    /// List registered model providers
    Providers,

    /// Report whether an environment API key exists for a provider
    ProbeEnv {
        /// Provider id (openai, anthropic, gemini, zai, custom)
        provider: String,
    },

    /// Load and validate the configuration
    CheckConfig,

    /// Ask the configured model how to group a set of URLs
    Suggest {
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
    },

    /// Run the engine against an in-memory browser
    Simulate {
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Grouping mode (auto, manual, disabled)
        #[arg(long, default_value = "auto")]
        mode: GroupingMode,

        /// Click every suggestion notification (manual mode)
        #[arg(long)]
        accept: bool,
    },
}
