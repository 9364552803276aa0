use crate::constants::{
    DEFAULT_HOST, default_check_deadline, default_connect_timeout, default_request_timeout,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings controlling where updates come from and how an attempt behaves.
///
/// Lives under the `[update]` table of the global config file. Every field
/// has a default, so an empty or missing table is valid.
///
/// # TOML Example
/// ```toml
/// [update]
/// host = "https://dist.example.com/"
/// project_name = "myapp"
/// request_timeout_secs = 120
/// check_interval = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Base URL of the distribution host. Normalized to end with `/`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Overrides the project namespace baked in at build time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// TCP connect timeout for each fetch, in seconds. `0` uses the default.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total timeout for each fetch, in seconds. `0` uses the default.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Deadline for the whole fetch phase of one attempt, in seconds. `0`
    /// uses the default.
    ///
    /// The update guard is held while fetching, so this also bounds how long
    /// a stalled host can delay queued attempts.
    #[serde(default = "default_check_deadline_secs")]
    pub check_deadline_secs: u64,

    /// Restart into the new executable after a successful install.
    #[serde(default = "default_true")]
    pub restart_after_install: bool,

    /// Seconds between periodic update checks. `0` disables them.
    #[serde(default)]
    pub check_interval: u64,

    /// Remove `.new`/`.old` leftovers of earlier attempts on startup.
    #[serde(default = "default_true")]
    pub sweep_residue_on_start: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            project_name: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            check_deadline_secs: default_check_deadline_secs(),
            restart_after_install: true,
            check_interval: 0,
            sweep_residue_on_start: true,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    default_connect_timeout().as_secs()
}

fn default_request_timeout_secs() -> u64 {
    default_request_timeout().as_secs()
}

fn default_check_deadline_secs() -> u64 {
    default_check_deadline().as_secs()
}

const fn default_true() -> bool {
    true
}

fn non_zero_secs(secs: u64, default: fn() -> Duration) -> Duration {
    if secs == 0 {
        default()
    } else {
        Duration::from_secs(secs)
    }
}

impl UpdateConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The host URL with a guaranteed trailing `/`.
    ///
    /// Release paths are appended directly to the host, so a missing slash
    /// would glue the project name onto the last host segment.
    #[must_use]
    pub fn normalized_host(&self) -> String {
        let host = self.host.trim();
        if host.ends_with('/') {
            host.to_string()
        } else {
            format!("{host}/")
        }
    }

    /// Per-fetch connect timeout. `0` means the default.
    pub fn connect_timeout(&self) -> Duration {
        non_zero_secs(self.connect_timeout_secs, default_connect_timeout)
    }

    /// Per-fetch total timeout. `0` means the default.
    pub fn request_timeout(&self) -> Duration {
        non_zero_secs(self.request_timeout_secs, default_request_timeout)
    }

    /// Fetch-phase deadline for one attempt. `0` means the default.
    pub fn check_deadline(&self) -> Duration {
        non_zero_secs(self.check_deadline_secs, default_check_deadline)
    }

    /// Periodic check interval, if enabled.
    pub const fn periodic_interval(&self) -> Option<Duration> {
        if self.check_interval == 0 {
            None
        } else {
            Some(Duration::from_secs(self.check_interval))
        }
    }

    /// Whether every field still holds its default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
