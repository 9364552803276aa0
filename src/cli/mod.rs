//! Command-line interface for liveupd.
//!
//! The binary is a thin shell around the [`upgrade`](crate::upgrade) module:
//! it builds an executor for its own executable from the global config and
//! runs one of the update entry points.
//!
//! # Available Commands
//!
//! - `check` - Run one update check against the release host
//! - `signal` - Report the version a peer runs; checks if it looks newer
//! - `watch` - Check periodically until interrupted
//! - `version` - Show the baked-in version and platform identifier
//! - `cleanup` - Remove `.new`/`.old` leftovers of earlier attempts
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--config` - Path to a custom config file (also `LIVEUPD_CONFIG`)
//!
//! `RUST_LOG` overrides both verbosity flags.
//!
//! # Examples
//!
//! ```bash
//! liveupd check
//! liveupd --verbose signal 9f8e7d6 20240611153000
//! liveupd --config ./staging.toml watch --interval 600
//! liveupd version --json
//! ```

mod check;
mod cleanup;
mod common;
mod signal;
mod version;
mod watch;

#[cfg(test)]
mod tests;

pub use common::CommandContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Main CLI application structure for liveupd.
#[derive(Parser, Debug)]
#[command(
    name = "liveupd",
    about = "In-place self-update for a running executable",
    version,
    long_about = "liveupd checks a release host for a newer build of this program, swaps the \
                  new executable onto disk without ever leaving the path empty, and restarts into it."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file.
    ///
    /// Defaults to `~/.liveupd/config.toml`. A missing file means defaults.
    #[arg(short, long, global = true, env = "LIVEUPD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one update check now.
    Check(check::CheckCommand),

    /// Report a peer's version and check for updates if it is newer.
    Signal(signal::SignalCommand),

    /// Check for updates periodically until interrupted.
    Watch(watch::WatchCommand),

    /// Show the version of this binary.
    Version(version::VersionCommand),

    /// Remove leftovers of earlier update attempts.
    Cleanup(cleanup::CleanupCommand),
}

impl Cli {
    /// Set up logging, load configuration and run the selected command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        let context = CommandContext::load(self.config.clone()).await?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(&context).await,
            Commands::Signal(cmd) => cmd.execute(&context).await,
            Commands::Watch(cmd) => cmd.execute(&context).await,
            Commands::Version(cmd) => cmd.execute(&context),
            Commands::Cleanup(cmd) => cmd.execute(&context).await,
        }
    }

    /// Default log level from the verbosity flags.
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("liveupd={}", self.log_level())));

        // Logs go to stderr so command output stays parseable.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
