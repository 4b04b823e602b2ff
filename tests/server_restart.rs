// tests/server_restart.rs

mod common;

use std::error::Error;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::common::{init_tracing, wait_for};
use devloop::daemon::{classify_exit, ServerExit, ServerSupervisor};
use devloop::exec::ExitError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn exit_classification_swallows_only_sigterm() {
    assert_eq!(classify_exit(&Ok(())), ServerExit::Clean);
    assert_eq!(
        classify_exit(&Err(ExitError::Signal {
            signal: Signal::SIGTERM as i32,
        })),
        ServerExit::Superseded
    );
    assert_eq!(
        classify_exit(&Err(ExitError::Signal {
            signal: Signal::SIGKILL as i32,
        })),
        ServerExit::Crashed
    );
    assert_eq!(
        classify_exit(&Err(ExitError::NonzeroStatus { code: 1 })),
        ServerExit::Crashed
    );
}

#[tokio::test]
async fn restart_replaces_the_previous_instance() -> TestResult {
    init_tracing();
    let supervisor = ServerSupervisor::new("sleep", "300");

    supervisor.restart();
    let first = supervisor
        .current_pid()
        .ok_or("no pid after first restart")?;

    supervisor.restart();
    let second = supervisor
        .current_pid()
        .ok_or("no pid after second restart")?;
    assert_ne!(first, second);

    // The first instance got SIGTERM and should be reaped shortly.
    let gone = wait_for(
        || kill(Pid::from_raw(first), None).is_err(),
        Duration::from_secs(2),
    )
    .await;
    assert!(gone, "previous server instance still alive");

    supervisor.shutdown();
    assert_eq!(supervisor.current_pid(), None);

    let gone = wait_for(
        || kill(Pid::from_raw(second), None).is_err(),
        Duration::from_secs(2),
    )
    .await;
    assert!(gone, "server instance still alive after shutdown");

    Ok(())
}

#[tokio::test]
async fn failed_server_start_is_not_fatal() {
    init_tracing();
    let supervisor = ServerSupervisor::new("devloop-test-no-such-runtime", "main.js");

    supervisor.restart();
    assert_eq!(supervisor.current_pid(), None);
}
