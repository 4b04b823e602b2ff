// src/engine/debounce.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

/// An asynchronous build operation driven by [`DebouncedBuilder`].
///
/// Implementations own whatever state the build needs and report failures
/// through their own logging; the builder only cares that a run completed,
/// never whether it succeeded.
pub trait BuildJob: Send + Sync {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Where the builder currently is in its run cycle.
///
/// `RunningQueued` can only be entered from `Running`, which keeps "queued
/// implies running" structural rather than checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Idle,
    Running,
    RunningQueued,
}

#[derive(Debug)]
struct BuilderState {
    debouncing: bool,
    phase: RunPhase,
}

struct BuilderInner {
    job: Box<dyn BuildJob>,
    period: Duration,
    state: Mutex<BuilderState>,
}

/// Coalesces bursts of change notifications into serialized build runs.
///
/// [`touch`](Self::touch) opens a debounce window (at most one at a time);
/// when the window expires a run is requested. At most one run is active at
/// any instant. A request landing mid-run is remembered and dispatched as
/// exactly one follow-up run, repeating until a run finishes with nothing
/// queued behind it.
#[derive(Clone)]
pub struct DebouncedBuilder {
    inner: Arc<BuilderInner>,
}

impl DebouncedBuilder {
    pub fn new(job: Box<dyn BuildJob>, period: Duration) -> Self {
        Self {
            inner: Arc::new(BuilderInner {
                job,
                period,
                state: Mutex::new(BuilderState {
                    debouncing: false,
                    phase: RunPhase::Idle,
                }),
            }),
        }
    }

    /// Signal that a relevant change happened.
    ///
    /// Idempotent while a debounce window is open; otherwise opens one of
    /// `period` and requests a run when it expires. Never suspends; must be
    /// called from within a tokio runtime.
    pub fn touch(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.debouncing {
                return;
            }
            state.debouncing = true;
        }

        let builder = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(builder.inner.period).await;
            builder.inner.state.lock().debouncing = false;
            builder.rebuild().await;
        });
    }

    /// Run the build now, serialized against any in-flight run.
    ///
    /// If a run is already active this returns immediately after queueing;
    /// the active runner picks the request up as soon as its current pass
    /// completes (not debounced). Queued requests collapse into one.
    pub async fn rebuild(&self) {
        {
            let mut state = self.inner.state.lock();
            match state.phase {
                RunPhase::Running => {
                    state.phase = RunPhase::RunningQueued;
                    return;
                }
                RunPhase::RunningQueued => return,
                RunPhase::Idle => state.phase = RunPhase::Running,
            }
        }

        loop {
            self.inner.job.run().await;

            let mut state = self.inner.state.lock();
            if state.phase == RunPhase::RunningQueued {
                state.phase = RunPhase::Running;
                drop(state);
                debug!("request arrived mid-run, running again");
                continue;
            }
            state.phase = RunPhase::Idle;
            return;
        }
    }
}
