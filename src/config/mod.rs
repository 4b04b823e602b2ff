// src/config/mod.rs

//! Configuration loading and validation for devloop.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load the optional config file from disk and validate it (`loader.rs`).
//!
//! The config file is optional by design: a project that sticks to the
//! default layout and entrypoints needs no `Devloop.toml` at all.

pub mod loader;
pub mod model;

pub use loader::{default_config_path, load_from_path, load_optional, validate_config};
pub use model::{
    BuildSection, BundlerSection, ConfigFile, Entrypoint, NativeSection, ServerSection,
    WatchSection,
};
