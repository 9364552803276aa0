use anyhow::Result;
use assert_cmd::Command;
use liveupd::utils::Platform;
use predicates::prelude::*;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

/// `liveupd` with an isolated (missing) config file.
fn liveupd(config_dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("liveupd")?;
    cmd.arg("--config").arg(config_dir.path().join("config.toml"));
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

/// Hidden sibling of the built binary that `check`/`cleanup` sweep.
fn binary_residue(suffix: &str) -> Result<PathBuf> {
    let binary = std::fs::canonicalize(assert_cmd::cargo::cargo_bin("liveupd"))?;
    let name = binary.file_name().unwrap_or_default().to_string_lossy().into_owned();
    Ok(binary.with_file_name(format!(".{name}.{suffix}")))
}

#[test]
fn test_version_json_reports_platform() -> Result<()> {
    let temp = TempDir::new()?;
    let output = liveupd(&temp)?.args(["version", "--json"]).output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["platform"], Platform::current().identifier());
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    assert_eq!(report["platform"], "linux_amd64");
    assert!(report.get("revision_tag").is_some());
    assert!(report.get("build_timestamp").is_some());
    Ok(())
}

#[test]
fn test_version_uses_configured_project() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("config.toml"), "[update]\nproject_name = \"myapp\"\n")?;

    liveupd(&temp)?
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("myapp"));
    Ok(())
}

#[test]
#[serial]
fn test_check_unconfigured_build_is_skipped() -> Result<()> {
    // Test builds carry no project name, so the check stops before any fetch.
    let temp = TempDir::new()?;
    liveupd(&temp)?
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
    Ok(())
}

#[test]
#[serial]
fn test_strict_check_fails_when_unconfigured() -> Result<()> {
    let temp = TempDir::new()?;
    liveupd(&temp)?
        .args(["check", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
    Ok(())
}

#[test]
fn test_signal_from_unknown_peer_is_ignored() -> Result<()> {
    let temp = TempDir::new()?;
    liveupd(&temp)?
        .args(["signal", "", "20991231235959"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored"));
    Ok(())
}

#[test]
fn test_watch_requires_interval() -> Result<()> {
    let temp = TempDir::new()?;
    liveupd(&temp)?
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("check interval"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("config.toml"), "[update\nhost = ")?;

    liveupd(&temp)?
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn test_verbose_and_quiet_conflict() -> Result<()> {
    let temp = TempDir::new()?;
    liveupd(&temp)?.args(["--verbose", "--quiet", "check"]).assert().failure();
    Ok(())
}

#[test]
#[serial]
fn test_cleanup_removes_leftovers_next_to_binary() -> Result<()> {
    let temp = TempDir::new()?;
    let old = binary_residue("old")?;
    std::fs::write(&old, b"previous build")?;

    liveupd(&temp)?
        .arg("cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 update leftover"));
    assert!(!old.exists());

    liveupd(&temp)?
        .arg("cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("No update leftovers found"));
    Ok(())
}
