// src/watch/mod.rs

//! File watching.
//!
//! This module wires up a cross-platform filesystem watcher (`notify`) and
//! forwards raw change events into the async world. It does **not** decide
//! which pipeline a change belongs to; that routing lives in
//! [`crate::daemon::route`].

pub mod watcher;

pub use watcher::{spawn_watcher, WatcherHandle};
