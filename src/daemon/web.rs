// src/daemon/web.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::bundler::{BundleHandle, BundleSpec, Bundler};
use crate::config::Entrypoint;
use crate::daemon::server::ServerSupervisor;
use crate::engine::BuildJob;
use crate::project::{self, ProjectLayout};
use crate::version::{self, BuildVersion};

/// Incremental handles retained from the first full build.
struct BundlePair {
    web: Box<dyn BundleHandle>,
    server: Box<dyn BundleHandle>,
}

/// The web build cycle: version scan, ephemeral module write, web + server
/// bundles, entrypoint HTML copy, server version file, then a server restart
/// on success.
///
/// A failed cycle leaves the previous artifacts and the running server
/// untouched. Runs are serialized by the owning [`DebouncedBuilder`], so the
/// handle pair is only ever mutated by one pass at a time.
///
/// [`DebouncedBuilder`]: crate::engine::DebouncedBuilder
pub struct WebPipeline {
    layout: ProjectLayout,
    entrypoints: Vec<Entrypoint>,
    web_spec: BundleSpec,
    server_spec: BundleSpec,
    bundler: Box<dyn Bundler>,
    supervisor: Option<Arc<ServerSupervisor>>,
    bundles: Mutex<Option<BundlePair>>,
}

impl WebPipeline {
    pub fn new(
        layout: ProjectLayout,
        entrypoints: Vec<Entrypoint>,
        bundler: Box<dyn Bundler>,
        supervisor: Option<Arc<ServerSupervisor>>,
    ) -> Self {
        let web_spec = project::web_bundle_spec(&layout, &entrypoints);
        let server_spec = project::server_bundle_spec(&layout);
        Self {
            layout,
            entrypoints,
            web_spec,
            server_spec,
            bundler,
            supervisor,
            bundles: Mutex::new(None),
        }
    }

    async fn cycle(&self) -> Result<BuildVersion> {
        let version = BuildVersion::scan(&self.layout.js_src)?;
        info!(version = %version, "starting web build");

        // Make the version available to the web bundle before bundling.
        version::write_ephemeral_module(&self.layout.ephemeral_module(), &version).await?;

        let mut bundles = self.bundles.lock().await;
        match bundles.take() {
            Some(pair) => {
                let (web, server) = tokio::join!(pair.web.rebuild(), pair.server.rebuild());
                // Handles survive a failed pass; the next one rebuilds again.
                *bundles = Some(pair);
                web.context("rebuilding web bundle")?;
                server.context("rebuilding server bundle")?;
            }
            None => {
                let (web, server) = tokio::join!(
                    self.bundler.build(self.web_spec.clone()),
                    self.bundler.build(self.server_spec.clone()),
                );
                *bundles = Some(BundlePair {
                    web: web.context("building web bundle")?,
                    server: server.context("building server bundle")?,
                });
            }
        }
        drop(bundles);

        let version_path = self.layout.server_version_file();
        let (html, version_file) = tokio::join!(
            self.copy_entrypoint_html(),
            version::write_server_version(&version_path, &version),
        );
        html?;
        version_file?;

        Ok(version)
    }

    /// Copy each entrypoint's `index.html` template into its output directory.
    async fn copy_entrypoint_html(&self) -> Result<()> {
        for entry in &self.entrypoints {
            let src = self.layout.js_src.join(&entry.dir).join("index.html");
            let dest_dir = self.layout.web_out.join(&entry.dir);

            tokio::fs::create_dir_all(&dest_dir)
                .await
                .with_context(|| format!("creating {}", dest_dir.display()))?;

            let dest = dest_dir.join("index.html");
            tokio::fs::copy(&src, &dest)
                .await
                .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
        }
        Ok(())
    }
}

impl BuildJob for WebPipeline {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let start = Instant::now();
            let result = self.cycle().await;
            let elapsed = start.elapsed().as_secs_f64();

            match result {
                Ok(version) => {
                    info!(version = %version, "web build completed in {:.3}s", elapsed);
                    if let Some(supervisor) = &self.supervisor {
                        supervisor.restart();
                    }
                }
                Err(err) => {
                    error!(error = %err, "web build failed after {:.3}s", elapsed);
                }
            }
        })
    }
}
