#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing_subscriber::fmt;

use devloop::bundler::{BundleHandle, BundleSpec, Bundler};
use devloop::engine::BuildJob;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Uses `with_test_writer()`, so logs are captured per-test and only printed
/// for failing tests (unless you run with `-- --nocapture`).
pub fn init_tracing() {
    INIT.call_once(|| {
        fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Poll `cond` until it holds or `timeout` elapses.
pub async fn wait_for(cond: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

#[derive(Default)]
struct RecorderState {
    started: usize,
    finished: usize,
    active: usize,
    max_active: usize,
}

/// Shared counters observing job runs from the outside.
#[derive(Clone, Default)]
pub struct RunRecorder {
    inner: Arc<Mutex<RecorderState>>,
}

impl RunRecorder {
    pub fn started(&self) -> usize {
        self.inner.lock().unwrap().started
    }

    pub fn finished(&self) -> usize {
        self.inner.lock().unwrap().finished
    }

    pub fn max_active(&self) -> usize {
        self.inner.lock().unwrap().max_active
    }

    fn begin(&self) {
        let mut state = self.inner.lock().unwrap();
        state.started += 1;
        state.active += 1;
        state.max_active = state.max_active.max(state.active);
    }

    fn end(&self) {
        let mut state = self.inner.lock().unwrap();
        state.active -= 1;
        state.finished += 1;
    }
}

/// Build job that records run boundaries.
///
/// Optionally sleeps per run, or holds each run open until the test hands
/// out a semaphore permit (one permit releases one run).
pub struct RecordingJob {
    recorder: RunRecorder,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingJob {
    pub fn new(recorder: RunRecorder) -> Self {
        Self {
            recorder,
            delay: None,
            gate: None,
        }
    }

    pub fn with_delay(recorder: RunRecorder, delay: Duration) -> Self {
        Self {
            recorder,
            delay: Some(delay),
            gate: None,
        }
    }

    pub fn gated(recorder: RunRecorder, gate: Arc<Semaphore>) -> Self {
        Self {
            recorder,
            delay: None,
            gate: Some(gate),
        }
    }
}

impl BuildJob for RecordingJob {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.recorder.begin();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            self.recorder.end();
        })
    }
}

/// Call log shared between a [`FakeBundler`] and its handles.
#[derive(Default)]
pub struct BundlerCalls {
    pub builds: Vec<String>,
    pub rebuilds: Vec<String>,
}

/// Bundler double that records build/rebuild calls instead of bundling.
#[derive(Clone, Default)]
pub struct FakeBundler {
    pub calls: Arc<Mutex<BundlerCalls>>,
}

impl Bundler for FakeBundler {
    fn build(
        &self,
        spec: BundleSpec,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BundleHandle>>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            calls.lock().unwrap().builds.push(spec.name.clone());
            Ok(Box::new(FakeHandle {
                name: spec.name,
                calls,
            }) as Box<dyn BundleHandle>)
        })
    }
}

pub struct FakeHandle {
    name: String,
    calls: Arc<Mutex<BundlerCalls>>,
}

impl BundleHandle for FakeHandle {
    fn rebuild(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().rebuilds.push(self.name.clone());
            Ok(())
        })
    }
}
