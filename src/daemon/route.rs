// src/daemon/route.rs

use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::project::ProjectLayout;

/// Which build pipeline a changed path feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Web,
    Native,
}

/// Decide which pipeline (if any) cares about a changed path.
///
/// The generated ephemeral directory is checked first and ignored outright:
/// the web build writes there on every pass, and reacting to those writes
/// would retrigger forever. Native changes only count for `.rs` files; the
/// native tree's build outputs and editor droppings churn constantly.
pub fn route_change(layout: &ProjectLayout, exclude: &GlobSet, path: &Path) -> Option<Pipeline> {
    if path.starts_with(&layout.ephemeral_dir) {
        return None;
    }

    if let Some(rel) = relative_str(&layout.root, path) {
        if exclude.is_match(&rel) {
            return None;
        }
    }

    if path.starts_with(&layout.js_src) {
        return Some(Pipeline::Web);
    }

    if path.starts_with(&layout.native_src) && path.extension().is_some_and(|ext| ext == "rs") {
        return Some(Pipeline::Native);
    }

    None
}

/// Compile the configured exclude patterns, matched against root-relative
/// paths with forward slashes.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    Some(s)
}
