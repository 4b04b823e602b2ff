// src/exec/mod.rs

//! Process execution layer.
//!
//! [`process`] wraps `tokio::process::Command` to turn a spawned child into
//! a control handle plus a completion future with a typed failure taxonomy
//! (nonzero exit vs. signal termination) and chunk-based output capture.
//! Everything in the crate that runs a subprocess (bundler invocations, the
//! native build script, the supervised server) goes through it.

pub mod process;

pub use process::{
    signal_name, spawn_process, Completion, ExitError, ProcessHandle, SpawnOptions,
    SpawnedProcess,
};
