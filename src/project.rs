// src/project.rs

//! Project root discovery and the fixed path layout.
//!
//! The layout is conventional rather than configured: web sources under
//! `src/`, native sources under `rs/`, build artifacts under `out/`. The
//! generated `src/web/ephemeral/` directory and the raw
//! `out/server/buildVersion` file are stable contracts with the frontend
//! and the server respectively.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::bundler::{BundleSpec, Platform};
use crate::config::Entrypoint;

/// Walk up from `start` to the first directory containing `package.json`.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join("package.json").is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(anyhow!(
                "project root not found when searching from {}",
                start.display()
            ));
        }
    }
}

/// Fixed path layout of a project rooted at `root`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Web and server sources: `<root>/src`.
    pub js_src: PathBuf,
    /// Native sources: `<root>/rs`.
    pub native_src: PathBuf,
    /// Build output root: `<root>/out`.
    pub out_dir: PathBuf,
    /// Web bundle output: `<root>/out/web`.
    pub web_out: PathBuf,
    /// Server bundle output: `<root>/out/server`.
    pub server_out: PathBuf,
    /// Generated sources the web build writes on every pass:
    /// `<root>/src/web/ephemeral`. Changes here must never retrigger builds.
    pub ephemeral_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let js_src = root.join("src");
        let out_dir = root.join("out");
        Self {
            native_src: root.join("rs"),
            web_out: out_dir.join("web"),
            server_out: out_dir.join("server"),
            ephemeral_dir: js_src.join("web").join("ephemeral"),
            js_src,
            out_dir,
            root,
        }
    }

    /// Generated module exposing the build version to web code.
    pub fn ephemeral_module(&self) -> PathBuf {
        self.ephemeral_dir.join("buildVersion.ts")
    }

    /// Raw version string file the server reads once at startup.
    pub fn server_version_file(&self) -> PathBuf {
        self.server_out.join("buildVersion")
    }

    /// Bundled server entrypoint launched by the supervisor.
    pub fn server_entry(&self) -> PathBuf {
        self.server_out.join("main.js")
    }

    /// Native build script, `script` relative to the native source tree.
    pub fn native_build_script(&self, script: &str) -> PathBuf {
        self.native_src.join(script)
    }
}

/// Browser bundle configuration for the web entrypoints.
pub fn web_bundle_spec(layout: &ProjectLayout, entrypoints: &[Entrypoint]) -> BundleSpec {
    BundleSpec {
        name: "web".to_string(),
        entry_points: entrypoints
            .iter()
            .map(|e| layout.js_src.join(&e.dir).join(&e.main))
            .collect(),
        outdir: layout.web_out.clone(),
        platform: Platform::Browser,
        target: vec![
            "chrome88".to_string(),
            "firefox84".to_string(),
            "safari14".to_string(),
        ],
        sourcemap: true,
        minify: false,
        // react-dom picks its production build off this.
        define: vec![(
            "process.env.NODE_ENV".to_string(),
            "\"production\"".to_string(),
        )],
        loaders: vec![
            (".obj".to_string(), "text".to_string()),
            (".gltf".to_string(), "json".to_string()),
            (".wasm".to_string(), "binary".to_string()),
        ],
        aliases: vec![("~".to_string(), layout.js_src.clone())],
    }
}

/// Node bundle configuration for the server entrypoint.
pub fn server_bundle_spec(layout: &ProjectLayout) -> BundleSpec {
    BundleSpec {
        name: "server".to_string(),
        entry_points: vec![layout.js_src.join("server").join("main.ts")],
        outdir: layout.server_out.clone(),
        platform: Platform::Node,
        target: vec!["es2019".to_string()],
        sourcemap: true,
        minify: false,
        define: Vec::new(),
        loaders: Vec::new(),
        aliases: Vec::new(),
    }
}
