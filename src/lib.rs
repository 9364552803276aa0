//! liveupd - in-place self-update for a running executable
//!
//! A program embedding liveupd checks a release host for a newer build of
//! itself, downloads the compressed executable for its platform, replaces its
//! own file on disk and restarts into it.
//!
//! # Architecture Overview
//!
//! Two cooperating components do the work:
//!
//! - The **decider** ([`upgrade::UpdateDecider`]) compares version
//!   identifiers, a build timestamp plus an opaque revision tag, and decides
//!   whether an attempt is worth running. Peers report their versions to it;
//!   manual and periodic checks go through it too.
//! - The **executor** ([`upgrade::UpdateExecutor`]) runs one serialized
//!   attempt: manifest, architecture list, payload, then the rename sequence
//!   of [`upgrade::ExecutableInstaller`] that never leaves the executable
//!   path without a runnable copy nearby.
//!
//! # Release Host Layout
//!
//! ```text
//! {host}{project}/LATEST                                  "{build} {rev} {prefix}"
//! {host}{project}/{prefix}.arch                           "linux_amd64 darwin_arm64 ..."
//! {host}{project}/{prefix}/{project}_{os}_{arch}.bz2      bzip2 of the raw executable
//! ```
//!
//! # Core Modules
//!
//! - [`upgrade`] - Decider, executor, installer, guard and release source
//! - [`version`] - Local version, remote manifest and the peer pre-filter
//! - [`config`] - Global configuration file (`~/.liveupd/config.toml`)
//! - [`core`] - Error types and user-facing error formatting
//! - [`cli`] - The `liveupd` command-line interface
//! - [`utils`] - Platform identification and file hiding
//! - [`constants`] - Defaults and well-known names
//!
//! # Example
//!
//! ```rust,no_run
//! use liveupd::config::GlobalConfig;
//! use liveupd::upgrade::{
//!     ExecutableInstaller, HttpReleaseSource, UpdateDecider, UpdateExecutor, UpdateGuard,
//! };
//! use liveupd::version::LocalVersion;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! let decider = UpdateDecider::new(UpdateExecutor::new(
//!     LocalVersion::from_build_env(),
//!     HttpReleaseSource::new(&config.update)?,
//!     ExecutableInstaller::for_current_exe()?,
//!     UpdateGuard::new(),
//! ));
//!
//! // Check hourly in the background.
//! let _periodic = decider.spawn_periodic(Duration::from_secs(3600));
//!
//! // Somewhere in peer discovery:
//! decider.signal_version("9f8e7d6", "20240611153000");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
