// src/daemon/native.rs

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info};

use crate::engine::BuildJob;
use crate::exec::{spawn_process, SpawnOptions};

/// Runs the external native build script when native sources change.
///
/// Failures are logged and swallowed: a broken native build never takes the
/// daemon down and never blocks the web pipeline.
pub struct NativePipeline {
    script: PathBuf,
}

impl NativePipeline {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    async fn build(&self) -> Result<()> {
        let spawned = spawn_process(
            SpawnOptions::new(self.script.to_string_lossy())
                .on_stdout(|chunk| info!("rs stdout: {}", chunk.trim_end()))
                .on_stderr(|chunk| info!("rs stderr: {}", chunk.trim_end())),
        )?;
        spawned.completion.wait().await?;
        Ok(())
    }
}

impl BuildJob for NativePipeline {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            info!("starting native build");
            let start = Instant::now();

            match self.build().await {
                Ok(()) => info!(
                    "native build completed in {:.3}s",
                    start.elapsed().as_secs_f64()
                ),
                Err(err) => error!(
                    error = %err,
                    "native build failed after {:.3}s",
                    start.elapsed().as_secs_f64()
                ),
            }
        })
    }
}
