//! Error handling for liveupd
//!
//! Two layers, as in the rest of the crate:
//! 1. [`UpdateError`] - strongly typed failures of the update protocol, one
//!    variant per failure class (configuration, transport, parse, platform,
//!    filesystem).
//! 2. [`ErrorContext`] - a wrapper that adds a suggestion and details for CLI
//!    users, produced by [`user_friendly_error`].
//!
//! The update check itself never lets an [`UpdateError`] escape: the executor
//! logs it and reports a boolean. The typed errors matter for the installer,
//! for tests, and for the CLI commands that call lower-level pieces directly.
//!
//! # Examples
//!
//! ```rust,no_run
//! use liveupd::core::{UpdateError, user_friendly_error};
//!
//! let err = UpdateError::NotConfigured {
//!     project: "unconfigured".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure classes of one update attempt.
///
/// Variants are grouped the way the attempt progresses: configuration, then
/// network transport and protocol parsing, then the platform match, then the
/// on-disk replacement steps.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The project identifier is missing or still the build placeholder.
    #[error("Project is not configured for updates (project name: '{project}')")]
    NotConfigured {
        /// The offending project name.
        project: String,
    },

    /// A fetch failed before a response body could be read.
    #[error("Failed to fetch {url}: {reason}")]
    Transport {
        /// URL that was requested.
        url: String,
        /// Transport-level reason reported by the HTTP client.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The fetch phase of an attempt ran past its deadline.
    #[error("Update check timed out after {after_secs}s")]
    Timeout {
        /// Deadline in seconds.
        after_secs: u64,
    },

    /// The `LATEST` manifest did not split into exactly three tokens.
    #[error("Failed to parse update manifest ({tokens} fields, expected 3): {raw:?}")]
    ManifestParse {
        /// The raw manifest body, kept for diagnosis.
        raw: String,
        /// Number of whitespace-separated tokens found.
        tokens: usize,
    },

    /// The release publishes no build for this platform.
    #[error("No version available for {platform}")]
    UnsupportedPlatform {
        /// Local `{os}_{arch}` identifier.
        platform: String,
    },

    /// The path of the running executable could not be determined.
    #[error("Cannot locate the running executable")]
    ExecutablePath {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing the staged `.new` file failed. Nothing was moved.
    #[error("Failed to stage new executable at {}", .path.display())]
    Staging {
        /// The staging path.
        path: PathBuf,
        /// Underlying I/O error (includes decompression failures).
        #[source]
        source: io::Error,
    },

    /// Moving the original executable aside failed. Nothing was moved.
    #[error("Failed to move {} to {}", .from.display(), .to.display())]
    Displace {
        /// The original executable path.
        from: PathBuf,
        /// The `.old` path.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Moving the staged file into place failed; the original was restored.
    #[error("Failed to install new executable at {}; previous version restored", .path.display())]
    Commit {
        /// The original executable path.
        path: PathBuf,
        /// Underlying I/O error of the forward rename.
        #[source]
        source: io::Error,
    },

    /// The forward rename and the restoring rename both failed. No
    /// executable exists at `path`.
    #[error(
        "No executable left at {}: install failed ({forward}) and restore failed ({restore}); \
         previous version is at {}, new version is at {}",
        .path.display(),
        .old_path.display(),
        .new_path.display()
    )]
    ExecutableLost {
        /// The original executable path, now empty.
        path: PathBuf,
        /// Where the previous executable still lives.
        old_path: PathBuf,
        /// Where the staged executable still lives.
        new_path: PathBuf,
        /// Error of the forward rename.
        forward: io::Error,
        /// Error of the restoring rename.
        restore: io::Error,
    },

    /// A blocking install task could not be joined.
    #[error("Install task failed: {reason}")]
    Task {
        /// Join failure description.
        reason: String,
    },
}

impl UpdateError {
    /// Whether the error leaves the host without an executable at its path.
    #[must_use]
    pub const fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::ExecutableLost { .. })
    }

    /// Whether the error is a network-side failure (transport, status, timeout).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. } | Self::Timeout { .. })
    }
}

/// Error wrapper with optional user-facing suggestion and details.
///
/// This is what the CLI prints when a command fails.
///
/// # Examples
///
/// ```rust,no_run
/// use liveupd::core::{ErrorContext, UpdateError};
///
/// let ctx = ErrorContext::new(UpdateError::UnsupportedPlatform {
///     platform: "linux_riscv64".to_string(),
/// })
/// .with_suggestion("Build from source for this platform")
/// .with_details("The release does not list this platform");
/// ctx.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error.
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Optional details explaining the error.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion or details.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion
    /// in green.
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion matched to
/// its type.
///
/// [`UpdateError`] variants get targeted advice; I/O errors get generic
/// permission/not-found advice; everything else passes through bare.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(update_error) = error.downcast_ref::<UpdateError>() {
        let (suggestion, details) = suggestion_for(update_error);
        let mut ctx = ErrorContext::new(error);
        if let Some(suggestion) = suggestion {
            ctx = ctx.with_suggestion(suggestion);
        }
        if let Some(details) = details {
            ctx = ctx.with_details(details);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<io::Error>() {
        match io_error.kind() {
            io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(error)
                    .with_suggestion(
                        "Check that the executable's directory is writable by the current user",
                    )
                    .with_details(
                        "Replacing the executable requires creating and renaming files next to it",
                    );
            }
            io::ErrorKind::NotFound => {
                return ErrorContext::new(error)
                    .with_suggestion("Check that the file or directory exists");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(error)
            .with_suggestion("Check the syntax of the liveupd config file")
            .with_details("The config file must be valid TOML");
    }

    ErrorContext::new(error)
}

fn suggestion_for(error: &UpdateError) -> (Option<&'static str>, Option<&'static str>) {
    match error {
        UpdateError::NotConfigured { .. } => (
            Some("Set project_name in the config file or build with LIVEUPD_PROJECT set"),
            Some("The project name selects the release namespace on the update host"),
        ),
        UpdateError::Transport { .. } | UpdateError::HttpStatus { .. } => (
            Some("Check network connectivity and the configured update host"),
            None,
        ),
        UpdateError::Timeout { .. } => (
            Some("Raise check_deadline_secs or request_timeout_secs in the config file"),
            None,
        ),
        UpdateError::ManifestParse { .. } => (
            None,
            Some("The LATEST file must contain: <build-timestamp> <revision> <archive-prefix>"),
        ),
        UpdateError::UnsupportedPlatform { .. } => (
            Some("Wait for a release that includes this platform, or build from source"),
            None,
        ),
        UpdateError::ExecutableLost { .. } => (
            Some("Rename the .old file (previous version) or the .new file back to the executable name"),
            Some("Both the install rename and the restoring rename failed"),
        ),
        UpdateError::Staging { .. }
        | UpdateError::Displace { .. }
        | UpdateError::Commit { .. } => (
            Some("Check free disk space and write permission on the executable's directory"),
            Some("The running executable was left in place"),
        ),
        UpdateError::ExecutablePath { .. } | UpdateError::Task { .. } => (None, None),
    }
}
