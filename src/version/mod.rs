//! Version identifiers and the comparisons the update decision is built on.
//!
//! A version is a pair of opaque strings: a revision tag (usually a commit
//! id) and a build timestamp. Neither is parsed. Timestamps are compared
//! ordinally, which is correct because the release pipeline publishes
//! sortable timestamp strings (`20240611153000`, ISO-8601, ...), not semver.
//!
//! # Module Organization
//!
//! - [`LocalVersion`] - the version baked into the running binary
//! - [`manifest`] - the transient remote manifest and architecture list
//! - [`peer_is_newer`] - the pre-filter applied to versions reported by peers
//!
//! # Examples
//!
//! ```rust
//! use liveupd::version::{LocalVersion, peer_is_newer};
//!
//! let local = LocalVersion::new("a1b2c3", "20240101000000", "myapp");
//! assert!(peer_is_newer(&local, "d4e5f6", "20240301000000"));
//! assert!(!peer_is_newer(&local, "d4e5f6", "20231201000000"));
//! assert!(!peer_is_newer(&local, "", "20990101000000"));
//! ```

pub mod manifest;

pub use manifest::{ArchitectureSet, RemoteManifest};

use crate::constants::UNCONFIGURED_PROJECT;
use serde::Serialize;
use std::fmt;

/// Version of the running binary, fixed at build time.
///
/// Constructed once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalVersion {
    revision_tag: String,
    build_timestamp: String,
    project_name: String,
}

impl LocalVersion {
    /// Create a version from explicit values.
    pub fn new(
        revision_tag: impl Into<String>,
        build_timestamp: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            revision_tag: revision_tag.into(),
            build_timestamp: build_timestamp.into(),
            project_name: project_name.into(),
        }
    }

    /// Read the version the build pipeline baked into this binary.
    ///
    /// Uses the compile-time variables `LIVEUPD_REVISION`,
    /// `LIVEUPD_BUILD_DATE` and `LIVEUPD_PROJECT`. Missing values fall back to
    /// an empty revision, an empty timestamp and the `unconfigured` project,
    /// which makes every update check fail fast as misconfigured.
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::new(
            option_env!("LIVEUPD_REVISION").unwrap_or_default(),
            option_env!("LIVEUPD_BUILD_DATE").unwrap_or_default(),
            option_env!("LIVEUPD_PROJECT").unwrap_or(UNCONFIGURED_PROJECT),
        )
    }

    /// Replace the project namespace, keeping revision and timestamp.
    ///
    /// Used when the config file overrides the build-time project name.
    #[must_use]
    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = project_name.into();
        self
    }

    /// Opaque revision tag (e.g. a commit id).
    pub fn revision_tag(&self) -> &str {
        &self.revision_tag
    }

    /// Opaque, ordinally comparable build timestamp.
    pub fn build_timestamp(&self) -> &str {
        &self.build_timestamp
    }

    /// Remote manifest namespace.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Whether the project name is usable for update checks.
    pub fn is_configured(&self) -> bool {
        let name = self.project_name.trim();
        !name.is_empty() && name != UNCONFIGURED_PROJECT
    }

    /// Whether `revision_tag` names this exact build.
    pub fn is_same_revision(&self, revision_tag: &str) -> bool {
        self.revision_tag == revision_tag
    }
}

impl fmt::Display for LocalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.build_timestamp, self.revision_tag)
    }
}

/// Decide whether a version reported by a peer warrants an update check.
///
/// Returns `false` when the peer is unknown (empty tag), runs the same
/// revision, or was built at or before the local build. Only a strictly
/// greater timestamp triggers a check. This is a pre-filter: the remote
/// manifest's revision tag is what decides whether anything is installed.
pub fn peer_is_newer(local: &LocalVersion, peer_revision_tag: &str, peer_build_timestamp: &str) -> bool {
    if peer_revision_tag.is_empty() {
        return false;
    }
    if local.is_same_revision(peer_revision_tag) {
        return false;
    }
    peer_build_timestamp > local.build_timestamp()
}
