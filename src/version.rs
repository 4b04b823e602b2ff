// src/version.rs

//! Build version token and the two files that carry it.
//!
//! The version is the newest modification time (unix milliseconds) across
//! the web source tree. It is injected into the web bundle through a
//! generated source module and written raw for the server to read at
//! startup. Both file formats are contracts: the frontend and server parse
//! them as-is.

use std::fmt;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Cache-busting token derived from the newest source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion(String);

impl BuildVersion {
    /// Newest modification time, in unix milliseconds, over all files under
    /// `root` recursively. A tree with no files yields `"0"`.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut newest: u128 = 0;

        for entry in WalkDir::new(root) {
            let entry = entry
                .with_context(|| format!("walking {} for modification times", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry
                .metadata()
                .with_context(|| format!("reading metadata for {}", entry.path().display()))?;
            let modified = metadata
                .modified()
                .with_context(|| format!("reading mtime for {}", entry.path().display()))?;

            // Pre-epoch mtimes fold to zero.
            let millis = modified
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            newest = newest.max(millis);
        }

        Ok(Self(newest.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write the generated source module exposing the build version to the web
/// bundle. The exact contents are a contract with the frontend.
pub async fn write_ephemeral_module(path: &Path, version: &BuildVersion) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let contents = format!("export const buildVersion = '{version}'");
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing build version module to {}", path.display()))
}

/// Write the raw version string the server reads once at startup.
pub async fn write_server_version(path: &Path, version: &BuildVersion) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    tokio::fs::write(path, version.as_str())
        .await
        .with_context(|| format!("writing build version file to {}", path.display()))
}
