//! Test utilities for liveupd
//!
//! Helpers for exercising the update protocol without a release host, a
//! writable installation or a real process restart:
//!
//! - [`MockReleaseSource`]: in-memory host counting requests
//! - [`FailingFileOps`] and [`SamplingFileOps`]: filesystem seams that inject
//!   rename failures or observe the directory between renames
//! - [`RecordingRestarter`]: records restarts instead of performing them
//! - [`fake_executable`] and [`bzip2_compress`]: on-disk and wire fixtures
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use liveupd::test_utils::{MockReleaseSource, RecordingRestarter, bzip2_compress, fake_executable};
//! use liveupd::upgrade::{ExecutableInstaller, UpdateExecutor, UpdateGuard};
//! use liveupd::version::LocalVersion;
//!
//! # async fn example() -> std::io::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let exe = fake_executable(dir.path(), "myapp", b"v1")?;
//! let source = MockReleaseSource::release(
//!     "20240611153000 9f8e7d6 20240611",
//!     "linux_amd64",
//!     bzip2_compress(b"v2")?,
//! );
//! let executor = UpdateExecutor::new(
//!     LocalVersion::new("a1b2c3d", "20240101000000", "myapp"),
//!     source,
//!     ExecutableInstaller::new(exe),
//!     UpdateGuard::new(),
//! )
//! .with_restarter(RecordingRestarter::new());
//! executor.check_for_update().await;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod source;

pub use fixtures::{
    FailingFileOps, RecordingRestarter, RenameSample, SamplingFileOps, bzip2_compress,
    fake_executable,
};
pub use source::MockReleaseSource;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=liveupd=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
