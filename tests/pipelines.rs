// tests/pipelines.rs

mod common;

use std::error::Error;
use std::fs;
use std::future::Future;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::common::{init_tracing, FakeBundler};
use devloop::bundler::{BundleHandle, BundleSpec, Bundler};
use devloop::config::Entrypoint;
use devloop::daemon::{NativePipeline, WebPipeline};
use devloop::engine::BuildJob;
use devloop::project::ProjectLayout;

type TestResult = Result<(), Box<dyn Error>>;

fn scaffold_web_project(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("src/client"))?;
    fs::write(root.join("src/client/main.ts"), "console.log('hi')\n")?;
    fs::write(root.join("src/client/index.html"), "<!doctype html>\n")?;
    fs::write(root.join("package.json"), "{}\n")?;
    Ok(())
}

fn client_entrypoints() -> Vec<Entrypoint> {
    vec![Entrypoint {
        dir: "client".to_string(),
        main: "main.ts".to_string(),
    }]
}

#[tokio::test]
async fn first_web_pass_builds_both_bundles_and_stamps_the_version() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    scaffold_web_project(&root)?;

    let layout = ProjectLayout::new(&root);
    let bundler = FakeBundler::default();
    let calls = Arc::clone(&bundler.calls);

    let pipeline = WebPipeline::new(layout.clone(), client_entrypoints(), Box::new(bundler), None);
    pipeline.run().await;

    {
        let calls = calls.lock().unwrap();
        let mut builds = calls.builds.clone();
        builds.sort();
        assert_eq!(builds, vec!["server".to_string(), "web".to_string()]);
        assert!(calls.rebuilds.is_empty());
    }

    // Raw version file and generated module agree, byte for byte.
    let version = fs::read_to_string(layout.server_version_file())?;
    assert!(version.parse::<u128>()? > 0);

    let ephemeral = fs::read_to_string(layout.ephemeral_module())?;
    assert_eq!(ephemeral, format!("export const buildVersion = '{version}'"));

    let html = fs::read_to_string(layout.web_out.join("client/index.html"))?;
    assert_eq!(html, "<!doctype html>\n");

    Ok(())
}

#[tokio::test]
async fn later_web_passes_rebuild_on_the_retained_handles() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    scaffold_web_project(&root)?;

    let layout = ProjectLayout::new(&root);
    let bundler = FakeBundler::default();
    let calls = Arc::clone(&bundler.calls);

    let pipeline = WebPipeline::new(layout, client_entrypoints(), Box::new(bundler), None);
    pipeline.run().await;
    pipeline.run().await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.builds.len(), 2);

    let mut rebuilds = calls.rebuilds.clone();
    rebuilds.sort();
    assert_eq!(rebuilds, vec!["server".to_string(), "web".to_string()]);

    Ok(())
}

struct FailingBundler;

impl Bundler for FailingBundler {
    fn build(
        &self,
        spec: BundleSpec,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn BundleHandle>>> + Send + '_>> {
        Box::pin(async move { Err(anyhow!("no bundle for '{}' today", spec.name)) })
    }
}

#[tokio::test]
async fn failed_web_pass_skips_the_post_build_steps() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    scaffold_web_project(&root)?;

    let layout = ProjectLayout::new(&root);
    let pipeline = WebPipeline::new(
        layout.clone(),
        client_entrypoints(),
        Box::new(FailingBundler),
        None,
    );

    // Completes despite the failure; pipelines own their errors.
    pipeline.run().await;

    // The ephemeral module is written before bundling, everything after the
    // failure point is not.
    assert!(layout.ephemeral_module().is_file());
    assert!(!layout.server_version_file().exists());
    assert!(!layout.web_out.join("client/index.html").exists());

    Ok(())
}

#[tokio::test]
async fn native_pipeline_runs_the_build_script() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir_all(root.join("rs"))?;

    let marker = root.join("rs/built-marker");
    let script = root.join("rs/build.sh");
    fs::write(
        &script,
        format!("#!/bin/sh\necho native build ran\ntouch {}\n", marker.display()),
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

    let pipeline = NativePipeline::new(&script);
    pipeline.run().await;

    assert!(marker.is_file());
    Ok(())
}

#[tokio::test]
async fn native_build_failures_are_swallowed() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir_all(root.join("rs"))?;

    let script = root.join("rs/build.sh");
    fs::write(&script, "#!/bin/sh\nexit 1\n")?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

    let pipeline = NativePipeline::new(&script);
    pipeline.run().await;

    Ok(())
}
