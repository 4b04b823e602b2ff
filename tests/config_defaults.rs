use std::error::Error;
use std::fs;

use devloop::config::{default_config_path, load_optional};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_config_falls_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = default_config_path(dir.path());
    assert!(path.ends_with("Devloop.toml"));

    let cfg = load_optional(&path)?;

    assert_eq!(cfg.build.period_ms, 1000);
    let dirs: Vec<&str> = cfg
        .build
        .entrypoints
        .iter()
        .map(|entry| entry.dir.as_str())
        .collect();
    assert_eq!(dirs, vec!["client", "tools/rendertoy"]);
    assert!(cfg.build.entrypoints.iter().all(|entry| entry.main == "main.ts"));

    assert_eq!(cfg.bundler.program, "esbuild");
    assert_eq!(cfg.server.runtime, "node");
    assert_eq!(cfg.native.script, "build.sh");
    assert!(cfg.watch.exclude.is_empty());

    Ok(())
}

#[test]
fn config_file_overrides_take_effect() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(
        &path,
        r#"
[build]
period_ms = 250

[[build.entrypoint]]
dir = "admin"

[server]
runtime = "deno"

[watch]
exclude = ["src/**/*.test.ts"]
"#,
    )?;

    let cfg = load_optional(&path)?;

    assert_eq!(cfg.build.period_ms, 250);
    assert_eq!(cfg.build.entrypoints.len(), 1);
    assert_eq!(cfg.build.entrypoints[0].dir, "admin");
    // Unset fields inside a declared entrypoint still get their defaults.
    assert_eq!(cfg.build.entrypoints[0].main, "main.ts");

    assert_eq!(cfg.bundler.program, "esbuild");
    assert_eq!(cfg.server.runtime, "deno");
    assert_eq!(cfg.watch.exclude, vec!["src/**/*.test.ts".to_string()]);

    Ok(())
}

#[test]
fn zero_debounce_period_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[build]\nperiod_ms = 0\n")?;

    let err = load_optional(&path).unwrap_err();
    assert!(format!("{err:#}").contains("period_ms"));

    Ok(())
}

#[test]
fn empty_entrypoint_list_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[build]\nentrypoint = []\n")?;

    let err = load_optional(&path).unwrap_err();
    assert!(format!("{err:#}").contains("at least one"));

    Ok(())
}

#[test]
fn invalid_exclude_pattern_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[watch]\nexclude = [\"src/[\"]\n")?;

    let err = load_optional(&path).unwrap_err();
    assert!(format!("{err:#}").contains("invalid glob pattern"));

    Ok(())
}
