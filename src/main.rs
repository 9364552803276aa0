//! liveupd CLI entry point
//!
//! Parses arguments, runs the selected command and turns failures into a
//! colored message with a suggestion and a non-zero exit code.

use anyhow::Result;
use clap::Parser;
use liveupd::cli;
use liveupd::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
