// src/cli.rs

//! Command line surface, parsed with clap's derive API.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Watch sources, rebuild bundles and restart the dev server on change."
)]
pub struct CliArgs {
    /// Project root. Defaults to the nearest ancestor directory containing
    /// a `package.json`.
    #[arg(long, value_name = "PATH")]
    pub root: Option<String>,

    /// Config file path. Defaults to `Devloop.toml` in the project root;
    /// a missing file means built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Build both pipelines once and exit, no watching and no server.
    #[arg(long)]
    pub once: bool,

    /// Logging level. Falls back to `DEVLOOP_LOG`, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve layout and config, print them, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
