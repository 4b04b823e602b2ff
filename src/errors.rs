// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Most fallible paths use `anyhow` directly. The one typed error surface is
//! the subprocess exit taxonomy, which lives next to the process runner in
//! [`crate::exec`] and is re-exported here.

pub use anyhow::{Error, Result};

pub use crate::exec::ExitError;
