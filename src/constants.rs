//! Global constants used throughout the liveupd codebase.
//!
//! Timeout durations, well-known file names, and placeholder values that are
//! shared by the configuration layer, the release source, and the installer.

use std::time::Duration;

/// Project name used when none was baked in at build time or configured.
///
/// A check attempt against this name is refused as a misconfiguration.
pub const UNCONFIGURED_PROJECT: &str = "unconfigured";

/// Default distribution host. Always ends with a `/`.
pub const DEFAULT_HOST: &str = "https://dist.liveupd.dev/";

/// Name of the "latest release" pointer under a project namespace.
pub const LATEST_POINTER: &str = "LATEST";

/// Extension of the per-release architecture list.
pub const ARCH_LIST_EXTENSION: &str = "arch";

/// Extension of the compressed payload.
pub const PAYLOAD_EXTENSION: &str = "bz2";

/// Suffix of the staged replacement executable (`.{name}.new`).
pub const NEW_SUFFIX: &str = "new";

/// Suffix of the displaced executable (`.{name}.old`).
pub const OLD_SUFFIX: &str = "old";

/// Default TCP connect timeout for release fetches (15 seconds).
pub fn default_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Default total request timeout for a single release fetch (5 minutes).
///
/// Payloads are whole executables, so this is sized for slow links.
pub fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

/// Default deadline for the fetch phase of one update attempt (10 minutes).
///
/// The update guard is held while fetching; this bounds how long an
/// unresponsive host can keep other attempts waiting.
pub fn default_check_deadline() -> Duration {
    Duration::from_secs(600)
}

/// User agent sent with every release fetch.
pub const USER_AGENT: &str = concat!("liveupd/", env!("CARGO_PKG_VERSION"), " (self-update)");
