// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use globset::Glob;
use tracing::debug;

use crate::config::model::ConfigFile;

/// Load the optional configuration file.
///
/// A missing file is not an error; it yields the built-in defaults. A file
/// that exists but fails to parse or validate is an error.
pub fn load_optional(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = ?path, "no config file, using defaults");
        return Ok(ConfigFile::default());
    }

    let config = load_from_path(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_optional`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `period_ms >= 1`
/// - at least one entrypoint, each with a non-empty `dir`
/// - non-empty bundler program, server runtime and native script
/// - all exclude patterns compile as globs
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.period_ms == 0 {
        return Err(anyhow!("[build].period_ms must be >= 1 (got 0)"));
    }

    if cfg.build.entrypoints.is_empty() {
        return Err(anyhow!(
            "config must declare at least one [[build.entrypoint]]"
        ));
    }
    for entry in &cfg.build.entrypoints {
        if entry.dir.is_empty() {
            return Err(anyhow!("[[build.entrypoint]] dir must not be empty"));
        }
        if entry.main.is_empty() {
            return Err(anyhow!(
                "[[build.entrypoint]] main must not be empty (entrypoint '{}')",
                entry.dir
            ));
        }
    }

    if cfg.bundler.program.is_empty() {
        return Err(anyhow!("[bundler].program must not be empty"));
    }
    if cfg.server.runtime.is_empty() {
        return Err(anyhow!("[server].runtime must not be empty"));
    }
    if cfg.native.script.is_empty() {
        return Err(anyhow!("[native].script must not be empty"));
    }

    for pat in &cfg.watch.exclude {
        Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
    }

    Ok(())
}

/// Helper to resolve the default config path for a project root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join("Devloop.toml")
}
