//! In-place self-update of the running executable.
//!
//! This module checks a release host for a newer build of the current
//! project, downloads the compressed executable for this platform, swaps it
//! onto disk without ever leaving the executable path empty, and restarts
//! the process into it.
//!
//! # Architecture Overview
//!
//! ## Core Components
//!
//! - **[`UpdateDecider`]**: entry points; filters peer-reported versions and
//!   schedules background and periodic checks
//! - **[`UpdateExecutor`]**: one serialized attempt from manifest fetch to restart
//! - **[`ExecutableInstaller`]**: the rename sequence replacing the executable
//! - **[`UpdateGuard`]**: the lock held for the whole of an attempt
//! - **[`config::UpdateConfig`]**: host, timeouts and scheduling options
//!
//! ## Update Process Flow
//!
//! ```text
//! 1. Decide
//!    ├── Peer signal: ignore empty, equal or older-or-equal timestamps
//!    └── Manual / periodic check: always proceed
//!
//! 2. Fetch (bounded by check_deadline)
//!    ├── GET {host}{project}/LATEST            -> "{build} {rev} {prefix}"
//!    ├── Stop if rev equals the local revision
//!    ├── GET {host}{project}/{prefix}.arch     -> "{os}_{arch} ..."
//!    ├── Stop if the local platform is not listed
//!    └── GET {host}{project}/{prefix}/{project}_{os}_{arch}.bz2
//!
//! 3. Install (blocking pool, never cancelled)
//!    ├── Stream-decompress into .{name}.new (mode 0755)
//!    ├── Rename {name} -> .{name}.old
//!    ├── Rename .{name}.new -> {name}, restoring .old on failure
//!    └── Remove .{name}.old, or hide it
//!
//! 4. Restart into the canonical executable path
//! ```
//!
//! # Failure Handling
//!
//! Every attempt ends in exactly one log line and a [`CheckOutcome`]; no
//! error escapes [`UpdateExecutor::check_for_update`]. Nothing is retried.
//! The only outcome needing operator attention is
//! [`UpdateError::ExecutableLost`](crate::core::UpdateError::ExecutableLost),
//! where both the commit rename and the restore rename failed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use liveupd::config::GlobalConfig;
//! use liveupd::upgrade::{
//!     ExecutableInstaller, HttpReleaseSource, UpdateDecider, UpdateExecutor, UpdateGuard,
//! };
//! use liveupd::version::LocalVersion;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! let executor = UpdateExecutor::new(
//!     LocalVersion::from_build_env(),
//!     HttpReleaseSource::new(&config.update)?,
//!     ExecutableInstaller::for_current_exe()?,
//!     UpdateGuard::new(),
//! );
//! let decider = UpdateDecider::new(executor);
//!
//! // A peer told us what it runs; returns immediately.
//! decider.signal_version("9f8e7d6", "20240611153000");
//! # Ok(())
//! # }
//! ```

/// Configuration of the release host, timeouts and scheduling.
pub mod config;
/// Peer signals, manual checks and periodic checks.
pub mod decider;
/// A single serialized update attempt.
pub mod executor;
/// The lock serializing update attempts.
pub mod guard;
/// Replacement of the executable on disk.
pub mod installer;
/// Re-executing the new binary.
pub mod restart;
/// Retrieval of release documents.
pub mod source;


pub use config::UpdateConfig;
pub use decider::UpdateDecider;
pub use executor::{CheckOutcome, UpdateExecutor};
pub use guard::{UpdateGuard, UpdatePermit};
pub use installer::{ExecutableInstaller, FileOps, InstallReport, StdFileOps, residue_path};
pub use restart::{ExecRestarter, NoRestart, Restarter};
pub use source::{HttpReleaseSource, ReleaseSource, ReleaseUrls};
