// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from `Devloop.toml`.
///
/// ```toml
/// [build]
/// period_ms = 1000
///
/// [[build.entrypoint]]
/// dir = "client"
/// main = "main.ts"
///
/// [server]
/// runtime = "node"
///
/// [watch]
/// exclude = ["src/**/*.test.ts"]
/// ```
///
/// All sections are optional and have defaults matching the conventional
/// project layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Debounce period and web entrypoints from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Bundler executable selection from `[bundler]`.
    #[serde(default)]
    pub bundler: BundlerSection,

    /// Supervised dev server settings from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// Native build settings from `[native]`.
    #[serde(default)]
    pub native: NativeSection,

    /// Extra watch exclusions from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Debounce window in milliseconds between a change burst and a rebuild.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Web entrypoints, each a directory under `src/` holding a main module
    /// and an `index.html` template. Declared as `[[build.entrypoint]]`.
    #[serde(default = "default_entrypoints", rename = "entrypoint")]
    pub entrypoints: Vec<Entrypoint>,
}

fn default_period_ms() -> u64 {
    1000
}

fn default_entrypoints() -> Vec<Entrypoint> {
    vec![
        Entrypoint {
            dir: "client".to_string(),
            main: default_entry_main(),
        },
        Entrypoint {
            dir: "tools/rendertoy".to_string(),
            main: default_entry_main(),
        },
    ]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            entrypoints: default_entrypoints(),
        }
    }
}

/// One web entrypoint: a directory under `src/` with a main module and an
/// `index.html` copied verbatim into the web output.
#[derive(Debug, Clone, Deserialize)]
pub struct Entrypoint {
    /// Directory relative to `src/`, e.g. `"client"` or `"tools/rendertoy"`.
    pub dir: String,

    /// Main module filename inside `dir`.
    #[serde(default = "default_entry_main")]
    pub main: String,
}

fn default_entry_main() -> String {
    "main.ts".to_string()
}

/// `[bundler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BundlerSection {
    /// Bundler executable name or path.
    ///
    /// A bare name is first looked up in `<root>/node_modules/.bin`.
    #[serde(default = "default_bundler_program")]
    pub program: String,
}

fn default_bundler_program() -> String {
    "esbuild".to_string()
}

impl Default for BundlerSection {
    fn default() -> Self {
        Self {
            program: default_bundler_program(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Runtime used to launch the bundled server entrypoint,
    /// i.e. `<runtime> out/server/main.js`.
    #[serde(default = "default_server_runtime")]
    pub runtime: String,
}

fn default_server_runtime() -> String {
    "node".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            runtime: default_server_runtime(),
        }
    }
}

/// `[native]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NativeSection {
    /// Build script filename, relative to the native source tree (`rs/`).
    #[serde(default = "default_native_script")]
    pub script: String,
}

fn default_native_script() -> String {
    "build.sh".to_string()
}

impl Default for NativeSection {
    fn default() -> Self {
        Self {
            script: default_native_script(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    /// Glob patterns (relative to the project root) whose changes are never
    /// routed to any pipeline.
    #[serde(default)]
    pub exclude: Vec<String>,
}
