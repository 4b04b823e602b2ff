// src/logging.rs

//! Logging setup.
//!
//! Level resolution order: the `--log-level` flag, then the `DEVLOOP_LOG`
//! environment variable, then `info`.

use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global tracing subscriber. Call once, at startup.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let level = cli_level
        .map(LogLevel::as_tracing)
        .unwrap_or_else(env_level);

    fmt().with_max_level(level).with_target(true).init();
}

fn env_level() -> Level {
    let Ok(raw) = std::env::var("DEVLOOP_LOG") else {
        return Level::INFO;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
