// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch the given roots recursively, forwarding raw notify events into an
/// unbounded channel consumable from async code.
///
/// Only changes arriving after this call are reported; there is no initial
/// scan. Roots are canonicalized best-effort so event paths line up with
/// layout paths even when a root is reached through a symlink. A root that
/// does not exist is skipped with a warning rather than failing startup.
pub fn spawn_watcher(
    roots: &[PathBuf],
) -> Result<(mpsc::UnboundedReceiver<Event>, WatcherHandle)> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("devloop: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("devloop: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .context("initializing file watcher")?;

    for root in roots {
        let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort
        if !root.is_dir() {
            warn!("watch root {} does not exist, skipping", root.display());
            continue;
        }
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", root.display()))?;
        info!("file watcher started on {:?}", root);
    }

    Ok((event_rx, WatcherHandle { _inner: watcher }))
}
