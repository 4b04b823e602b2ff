// src/daemon/server.rs

use std::path::PathBuf;

use nix::sys::signal::Signal;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::exec::{spawn_process, ExitError, ProcessHandle, SpawnOptions, SpawnedProcess};

/// Owns the supervised dev server process across rebuilds.
///
/// At most one instance is alive at a time. [`restart`](Self::restart)
/// terminates the previous instance without waiting for it and installs the
/// replacement; the old instance's SIGTERM death is expected and not treated
/// as a failure.
pub struct ServerSupervisor {
    runtime: String,
    entry: PathBuf,
    current: Mutex<Option<ProcessHandle>>,
}

/// How a supervised server instance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// Exited on its own with status 0.
    Clean,
    /// Terminated by the SIGTERM sent when replacing or shutting down.
    Superseded,
    /// Anything else.
    Crashed,
}

/// Map a completed server process result onto the supervision outcome.
///
/// Only SIGTERM is swallowed; a server dying to any other signal or exiting
/// nonzero is a crash worth surfacing.
pub fn classify_exit(result: &Result<(), ExitError>) -> ServerExit {
    match result {
        Ok(()) => ServerExit::Clean,
        Err(ExitError::Signal { signal }) if *signal == Signal::SIGTERM as i32 => {
            ServerExit::Superseded
        }
        Err(_) => ServerExit::Crashed,
    }
}

impl ServerSupervisor {
    pub fn new(runtime: impl Into<String>, entry: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            entry: entry.into(),
            current: Mutex::new(None),
        }
    }

    /// Replace the running server with a freshly built one.
    ///
    /// The previous instance gets a SIGTERM and is not awaited. Failing to
    /// start the replacement is logged, not fatal; the next successful build
    /// will try again.
    pub fn restart(&self) {
        if let Some(previous) = self.current.lock().take() {
            debug!(pid = previous.pid(), "terminating previous server");
            previous.terminate();
        }

        let opts = SpawnOptions::new(&self.runtime)
            .arg(self.entry.to_string_lossy())
            .on_stdout(|chunk| info!("{}", chunk.trim_end()))
            .on_stderr(|chunk| info!("{}", chunk.trim_end()));

        let SpawnedProcess { handle, completion } = match spawn_process(opts) {
            Ok(spawned) => spawned,
            Err(err) => {
                error!(error = %err, "failed to start server");
                return;
            }
        };

        info!(pid = handle.pid(), "server started");
        *self.current.lock() = Some(handle);

        tokio::spawn(async move {
            let result = completion.wait().await;
            match classify_exit(&result) {
                ServerExit::Superseded => {
                    debug!("previous server instance terminated");
                }
                ServerExit::Clean => {
                    info!("server exited cleanly");
                }
                ServerExit::Crashed => {
                    if let Err(err) = result {
                        error!(error = %err, "server crashed unexpectedly");
                    }
                }
            }
        });
    }

    /// Terminate the supervised server, if any. Used on daemon shutdown.
    pub fn shutdown(&self) {
        if let Some(server) = self.current.lock().take() {
            debug!(pid = server.pid(), "terminating server on shutdown");
            server.terminate();
        }
    }

    /// Pid of the currently installed instance, if any.
    pub fn current_pid(&self) -> Option<i32> {
        self.current.lock().as_ref().map(|handle| handle.pid())
    }
}
