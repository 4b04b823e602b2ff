// src/exec/process.rs

use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::debug;

/// How a finished subprocess failed.
///
/// A process that exits with status 0 and was not signalled is a success and
/// produces no `ExitError` at all.
#[derive(Debug, Error)]
pub enum ExitError {
    /// The process exited on its own with a nonzero status code.
    #[error("process exited with nonzero status code {code}")]
    NonzeroStatus { code: i32 },

    /// The process was terminated by a signal before it could exit.
    #[error("process terminated by signal {}", signal_name(*.signal))]
    Signal { signal: i32 },
}

/// Human-readable name for a raw signal number, e.g. 15 -> "SIGTERM".
pub fn signal_name(signal: i32) -> String {
    match Signal::try_from(signal) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("signal {signal}"),
    }
}

/// Callback receiving decoded output as it arrives.
///
/// Chunks are whatever the OS delivers; boundaries are not line-aligned.
pub type OutputSink = Box<dyn FnMut(&str) + Send>;

/// What to spawn and where its output goes.
///
/// Streams without a sink are attached to `/dev/null` so an ignored stream
/// can never backpressure the child.
pub struct SpawnOptions {
    cmd: String,
    args: Vec<String>,
    on_stdout: Option<OutputSink>,
    on_stderr: Option<OutputSink>,
}

impl fmt::Debug for SpawnOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnOptions")
            .field("cmd", &self.cmd)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl SpawnOptions {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args: Vec::new(),
            on_stdout: None,
            on_stderr: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn on_stdout(mut self, sink: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_stdout = Some(Box::new(sink));
        self
    }

    pub fn on_stderr(mut self, sink: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_stderr = Some(Box::new(sink));
        self
    }
}

/// Out-of-band control for a spawned process.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: i32,
}

impl ProcessHandle {
    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Ask the process to terminate (SIGTERM), without waiting for it.
    ///
    /// Delivery failures (typically: the process is already gone) are logged
    /// at debug and ignored.
    pub fn terminate(&self) {
        if self.pid <= 0 {
            return;
        }
        if let Err(err) = signal::kill(Pid::from_raw(self.pid), Signal::SIGTERM) {
            debug!(pid = self.pid, error = %err, "failed to signal process");
        }
    }
}

/// Completion half of a spawned process.
///
/// Resolves once the process has exited *and* both output pumps have drained,
/// so any captured output is complete by the time `wait` returns.
pub struct Completion {
    rx: oneshot::Receiver<Result<(), ExitError>>,
}

impl Completion {
    /// Wait for the process to finish.
    pub async fn wait(self) -> Result<(), ExitError> {
        match self.rx.await {
            Ok(result) => result,
            // The monitor task always sends before dropping; a dead channel
            // means the runtime tore it down mid-flight.
            Err(_) => Err(ExitError::NonzeroStatus { code: -1 }),
        }
    }
}

/// A live subprocess: the control handle plus the completion future.
pub struct SpawnedProcess {
    pub handle: ProcessHandle,
    pub completion: Completion,
}

/// Spawn a process per `opts`.
///
/// Returns immediately with a [`SpawnedProcess`]; the process is monitored by
/// a background task that pumps output into the sinks and classifies the exit
/// status. Only failing to start the process at all is an error here.
pub fn spawn_process(opts: SpawnOptions) -> Result<SpawnedProcess> {
    let SpawnOptions {
        cmd,
        args,
        on_stdout,
        on_stderr,
    } = opts;

    let mut command = Command::new(&cmd);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(pipe_or_null(on_stdout.is_some()))
        .stderr(pipe_or_null(on_stderr.is_some()))
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process '{cmd}'"))?;

    let pid = child.id().map(|id| id as i32).unwrap_or(-1);
    debug!(cmd = %cmd, pid, "process spawned");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        // Drain both streams fully before reaping, mirroring the order the
        // sinks rely on: last chunk delivered, then completion.
        tokio::join!(pump_stream(stdout, on_stdout), pump_stream(stderr, on_stderr));

        let result = match child.wait().await {
            Ok(status) => {
                debug!(cmd = %cmd, status = ?status, "process exited");
                classify_status(status)
            }
            Err(err) => {
                debug!(cmd = %cmd, error = %err, "failed waiting for process");
                Err(ExitError::NonzeroStatus { code: -1 })
            }
        };

        let _ = done_tx.send(result);
    });

    Ok(SpawnedProcess {
        handle: ProcessHandle { pid },
        completion: Completion { rx: done_rx },
    })
}

fn pipe_or_null(piped: bool) -> Stdio {
    if piped { Stdio::piped() } else { Stdio::null() }
}

async fn pump_stream<R>(stream: Option<R>, sink: Option<OutputSink>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let (Some(mut stream), Some(mut sink)) = (stream, sink) else {
        return;
    };

    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]);
                sink(&chunk);
            }
            Err(err) => {
                debug!(error = %err, "stopped reading process output");
                break;
            }
        }
    }
}

fn classify_status(status: ExitStatus) -> Result<(), ExitError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(ExitError::NonzeroStatus { code });
    }
    if let Some(signal) = status.signal() {
        return Err(ExitError::Signal { signal });
    }
    Err(ExitError::NonzeroStatus { code: -1 })
}
