// src/bundler/mod.rs

//! Bundler abstraction.
//!
//! The daemon drives an artifact bundler through a deliberately narrow
//! interface: a full [`Bundler::build`] returning a per-bundle handle, and
//! [`BundleHandle::rebuild`] on that handle for subsequent passes. What the
//! bundler does internally (module resolution, compilation, incrementality)
//! is its own affair.
//!
//! The production implementation, [`Esbuild`], shells out to the esbuild
//! executable; tests substitute a recording fake behind the same traits.

pub mod esbuild;

pub use esbuild::{bundle_args, Esbuild};

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Result;

/// Which environment a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Node,
}

/// Everything the bundler needs to produce one bundle.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    /// Short name used in logs and error contexts ("web", "server").
    pub name: String,
    pub entry_points: Vec<PathBuf>,
    pub outdir: PathBuf,
    pub platform: Platform,
    /// Target environments, e.g. `["chrome88", "firefox84"]` or `["es2019"]`.
    pub target: Vec<String>,
    pub sourcemap: bool,
    pub minify: bool,
    /// Compile-time constant substitutions, `(key, replacement)`.
    pub define: Vec<(String, String)>,
    /// Extra content loaders by extension, `(".wasm", "binary")`.
    pub loaders: Vec<(String, String)>,
    /// Import path aliases, `("~", <dir>)`.
    pub aliases: Vec<(String, PathBuf)>,
}

/// An artifact bundler.
pub trait Bundler: Send + Sync {
    /// Run a full build for `spec`, returning a handle that can rebuild the
    /// same bundle.
    fn build(
        &self,
        spec: BundleSpec,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BundleHandle>>> + Send + '_>>;
}

/// Rebuild capability retained from a previous full build.
pub trait BundleHandle: Send {
    /// Rebuild the bundle with the same configuration as the original build.
    fn rebuild(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
