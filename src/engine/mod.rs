// src/engine/mod.rs

//! Build scheduling engine.
//!
//! This module owns the debounce-and-serialize layer between raw change
//! notifications and the build pipelines:
//! - bursts of `touch()` calls coalesce into a single run
//! - runs of one job never overlap
//! - a change landing mid-run schedules exactly one follow-up run

pub mod debounce;

pub use debounce::{BuildJob, DebouncedBuilder};
