// src/daemon/mod.rs

//! The development daemon.
//!
//! Wires filesystem changes into two independent debounced pipelines:
//! - **web**: bundle web + server entrypoints, stamp the build version,
//!   restart the supervised dev server on success (`web.rs`).
//! - **native**: run the external native build script (`native.rs`).
//!
//! Routing lives in `route.rs`; the server process lifecycle in `server.rs`.

pub mod native;
pub mod route;
pub mod server;
pub mod web;

pub use native::NativePipeline;
pub use route::{build_exclude_set, route_change, Pipeline};
pub use server::{classify_exit, ServerExit, ServerSupervisor};
pub use web::WebPipeline;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use globset::GlobSet;
use tracing::{debug, info};

use crate::bundler::Bundler;
use crate::config::ConfigFile;
use crate::engine::DebouncedBuilder;
use crate::project::ProjectLayout;
use crate::watch;

/// Top-level daemon owning the watch subscription, both pipelines and the
/// server supervisor.
pub struct DevDaemon {
    layout: ProjectLayout,
    exclude: GlobSet,
    web: DebouncedBuilder,
    native: DebouncedBuilder,
    supervisor: Option<Arc<ServerSupervisor>>,
}

impl DevDaemon {
    /// Wire up both pipelines. `serve` controls whether a server supervisor
    /// is attached; the one-shot mode builds without serving.
    pub fn new(
        layout: ProjectLayout,
        cfg: &ConfigFile,
        bundler: Box<dyn Bundler>,
        serve: bool,
    ) -> Result<Self> {
        let exclude = build_exclude_set(&cfg.watch.exclude)?;
        let period = Duration::from_millis(cfg.build.period_ms);

        let supervisor = serve.then(|| {
            Arc::new(ServerSupervisor::new(
                &cfg.server.runtime,
                layout.server_entry(),
            ))
        });

        let web = WebPipeline::new(
            layout.clone(),
            cfg.build.entrypoints.clone(),
            bundler,
            supervisor.clone(),
        );
        let native = NativePipeline::new(layout.native_build_script(&cfg.native.script));

        Ok(Self {
            layout,
            exclude,
            web: DebouncedBuilder::new(Box::new(web), period),
            native: DebouncedBuilder::new(Box::new(native), period),
            supervisor,
        })
    }

    /// Run one pass of both pipelines and return.
    pub async fn build_once(&self) {
        self.web.rebuild().await;
        self.native.rebuild().await;
    }

    /// Watch for changes and keep rebuilding until Ctrl-C.
    ///
    /// The first web pass is eager: it starts as soon as the watcher is up,
    /// without waiting for a change. Triggers landing during that pass queue
    /// behind it like any other.
    pub async fn run(&self) -> Result<()> {
        let roots = [self.layout.js_src.clone(), self.layout.native_src.clone()];
        let (mut events, _watcher) = watch::spawn_watcher(&roots)?;

        let web = self.web.clone();
        tokio::spawn(async move { web.rebuild().await });

        info!("watching for changes");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("watch channel closed");
                        break;
                    };
                    for path in &event.paths {
                        match route_change(&self.layout, &self.exclude, path) {
                            Some(Pipeline::Web) => self.web.touch(),
                            Some(Pipeline::Native) => self.native.touch(),
                            None => {}
                        }
                    }
                }
            }
        }

        if let Some(supervisor) = &self.supervisor {
            supervisor.shutdown();
        }

        Ok(())
    }
}
