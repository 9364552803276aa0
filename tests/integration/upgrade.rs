use anyhow::Result;
use liveupd::config::GlobalConfig;
use liveupd::core::UpdateError;
use liveupd::test_utils::{RecordingRestarter, bzip2_compress, fake_executable, init_test_logging};
use liveupd::upgrade::{
    CheckOutcome, ExecutableInstaller, HttpReleaseSource, UpdateConfig, UpdateDecider,
    UpdateExecutor, UpdateGuard,
};
use liveupd::utils::Platform;
use liveupd::version::LocalVersion;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANIFEST: &str = "20240611153000 9f8e7d6 20240611\n";
const MANIFEST_PATH: &str = "/myapp/LATEST";
const ARCH_PATH: &str = "/myapp/20240611.arch";
const PAYLOAD_PATH: &str = "/myapp/20240611/myapp_linux_amd64.bz2";

/// Serve `body` at `url_path`, expecting exactly `hits` requests.
async fn mount(server: &MockServer, url_path: &str, body: impl Into<Vec<u8>>, hits: u64) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .expect(hits)
        .mount(server)
        .await;
}

/// Request paths seen by `server`, in arrival order.
async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

fn http_source(server: &MockServer) -> Result<HttpReleaseSource> {
    let config = UpdateConfig {
        host: server.uri(),
        connect_timeout_secs: 5,
        request_timeout_secs: 10,
        ..UpdateConfig::default()
    };
    Ok(HttpReleaseSource::new(&config)?)
}

fn installed_executable(dir: &TempDir) -> Result<PathBuf> {
    let exe = fake_executable(dir.path(), "myapp", b"#!/bin/sh\necho old\n")?;
    Ok(fs::canonicalize(exe)?)
}

/// Full attempt over HTTP: manifest, architecture list, payload, swap, restart.
#[tokio::test]
async fn test_http_update_installs_and_restarts() -> Result<()> {
    init_test_logging(None);
    let server = MockServer::start().await;
    mount(&server, MANIFEST_PATH, MANIFEST, 1).await;
    mount(&server, ARCH_PATH, "linux_amd64\nlinux_arm64\n", 1).await;
    mount(&server, PAYLOAD_PATH, bzip2_compress(b"#!/bin/sh\necho new\n")?, 1).await;

    let dir = TempDir::new()?;
    let exe = installed_executable(&dir)?;
    let restarter = RecordingRestarter::new();

    let executor = UpdateExecutor::new(
        LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
        http_source(&server)?,
        ExecutableInstaller::new(&exe),
        UpdateGuard::new(),
    )
    .with_platform(Platform::new("linux", "amd64"))
    .with_restarter(restarter.clone());

    assert!(executor.check_for_update().await);
    assert_eq!(fs::read(&exe)?, b"#!/bin/sh\necho new\n");
    assert_eq!(restarter.restarts(), vec![exe.clone()]);
    assert_eq!(requested_paths(&server).await, vec![MANIFEST_PATH, ARCH_PATH, PAYLOAD_PATH]);

    Ok(())
}

/// Same revision on the host: only the manifest is requested.
#[tokio::test]
async fn test_http_up_to_date_requests_manifest_only() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, MANIFEST_PATH, "20240611153000 a1b2c3d 20240611", 2).await;
    mount(&server, ARCH_PATH, "linux_amd64", 0).await;
    mount(&server, PAYLOAD_PATH, bzip2_compress(b"unused")?, 0).await;

    let dir = TempDir::new()?;
    let exe = installed_executable(&dir)?;

    let decider = UpdateDecider::new(
        UpdateExecutor::new(
            LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
            http_source(&server)?,
            ExecutableInstaller::new(&exe),
            UpdateGuard::new(),
        )
        .with_platform(Platform::new("linux", "amd64"))
        .with_restarter(RecordingRestarter::new()),
    );

    assert!(!decider.check_for_update().await);
    assert!(!decider.check_for_update().await);
    assert_eq!(fs::read(&exe)?, b"#!/bin/sh\necho old\n");

    Ok(())
}

/// A peer signal triggers a background attempt against the host.
#[tokio::test]
async fn test_peer_signal_reaches_host() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, MANIFEST_PATH, "20240611153000 a1b2c3d 20240611", 1).await;

    let dir = TempDir::new()?;
    let exe = installed_executable(&dir)?;

    let decider = UpdateDecider::new(UpdateExecutor::new(
        LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
        http_source(&server)?,
        ExecutableInstaller::new(&exe),
        UpdateGuard::new(),
    ));

    decider.signal_version("", "20991231000000");
    decider.signal_version("9f8e7d6", "20240611153000");

    for _ in 0..200 {
        if !requested_paths(&server).await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(requested_paths(&server).await, vec![MANIFEST_PATH]);

    Ok(())
}

/// Missing documents surface as HTTP status errors; the executable is untouched.
#[tokio::test]
async fn test_http_missing_payload_leaves_executable() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, MANIFEST_PATH, MANIFEST, 1).await;
    mount(&server, ARCH_PATH, "linux_amd64", 1).await;
    Mock::given(method("GET"))
        .and(path(PAYLOAD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let exe = installed_executable(&dir)?;

    let executor = UpdateExecutor::new(
        LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
        http_source(&server)?,
        ExecutableInstaller::new(&exe),
        UpdateGuard::new(),
    )
    .with_platform(Platform::new("linux", "amd64"))
    .with_restarter(RecordingRestarter::new());

    match executor.run_check().await {
        CheckOutcome::FetchFailed(UpdateError::HttpStatus {
            status, ..
        }) => assert_eq!(status, 404),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(fs::read(&exe)?, b"#!/bin/sh\necho old\n");
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}

/// The installer replaces the file a symlink points to, not the link.
#[cfg(unix)]
#[test]
fn test_install_through_symlink() -> Result<()> {
    let dir = TempDir::new()?;
    let real_dir = dir.path().join("versions");
    fs::create_dir(&real_dir)?;
    let real = fake_executable(&real_dir, "myapp-1.0", b"old")?;
    let link = dir.path().join("myapp");
    std::os::unix::fs::symlink(&real, &link)?;

    let report = ExecutableInstaller::new(&link).install(&b"new"[..])?;

    assert_eq!(report.path, fs::canonicalize(&real)?);
    assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
    assert_eq!(fs::read(&link)?, b"new");
    Ok(())
}

/// Config written by one process is read back identically.
#[tokio::test]
async fn test_config_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("config.toml");

    let config = GlobalConfig {
        update: UpdateConfig {
            host: "https://dist.example.com/".to_string(),
            project_name: Some("myapp".to_string()),
            check_interval: 3600,
            restart_after_install: false,
            ..UpdateConfig::default()
        },
    };
    config.save_to(&path).await?;

    let loaded = GlobalConfig::load_with_optional(Some(path)).await?;
    assert_eq!(loaded, config);
    assert_eq!(loaded.update.periodic_interval(), Some(Duration::from_secs(3600)));

    Ok(())
}
