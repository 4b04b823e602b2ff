// src/lib.rs

pub mod bundler;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod project;
pub mod version;
pub mod watch;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::bundler::Esbuild;
use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_optional};
use crate::config::ConfigFile;
use crate::daemon::DevDaemon;
use crate::project::ProjectLayout;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project root discovery
/// - config loading
/// - the bundler and both build pipelines
/// - the file watcher and daemon loop
pub async fn run(args: CliArgs) -> Result<()> {
    let root = resolve_root(&args)?;
    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_config_path(&root));
    let cfg = load_optional(&config_path)?;

    let layout = ProjectLayout::new(root);

    if args.dry_run {
        print_dry_run(&layout, &cfg);
        return Ok(());
    }

    let bundler = Esbuild::resolve(&layout.root, &cfg.bundler.program);
    let daemon = DevDaemon::new(layout, &cfg, Box::new(bundler), !args.once)?;

    if args.once {
        daemon.build_once().await;
        return Ok(());
    }

    daemon.run().await
}

/// Resolve the project root: `--root` if given, otherwise walk up from the
/// current directory to the first `package.json`. Canonicalized so watch
/// event paths line up with the layout.
fn resolve_root(args: &CliArgs) -> Result<PathBuf> {
    let root = match &args.root {
        Some(root) => PathBuf::from(root),
        None => {
            let cwd = env::current_dir().context("reading current directory")?;
            project::find_project_root(&cwd)?
        }
    };
    root.canonicalize()
        .with_context(|| format!("resolving project root {}", root.display()))
}

/// Simple dry-run output: print the resolved layout and config.
fn print_dry_run(layout: &ProjectLayout, cfg: &ConfigFile) {
    println!("devloop dry-run");
    println!("  root: {}", layout.root.display());
    println!("  js source: {}", layout.js_src.display());
    println!("  native source: {}", layout.native_src.display());
    println!("  web output: {}", layout.web_out.display());
    println!("  server output: {}", layout.server_out.display());
    println!();

    println!("  build.period_ms = {}", cfg.build.period_ms);
    println!("  entrypoints ({}):", cfg.build.entrypoints.len());
    for entry in &cfg.build.entrypoints {
        println!("    - {}/{}", entry.dir, entry.main);
    }
    println!("  bundler.program = {}", cfg.bundler.program);
    println!("  server.runtime = {}", cfg.server.runtime);
    println!("  native.script = {}", cfg.native.script);
    if !cfg.watch.exclude.is_empty() {
        println!("  watch.exclude = {:?}", cfg.watch.exclude);
    }
}
