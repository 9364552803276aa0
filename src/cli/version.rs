use super::common::CommandContext;
use crate::utils::platform::Platform;
use crate::version::LocalVersion;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

/// Show the version of this binary and the platform it matches releases by.
#[derive(Args, Debug)]
pub struct VersionCommand {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What `version --json` prints.
#[derive(Debug, Serialize)]
pub struct VersionReport<'a> {
    #[serde(flatten)]
    pub version: &'a LocalVersion,
    pub platform: String,
    pub configured: bool,
}

impl VersionCommand {
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let version = context.local_version();
        let report = VersionReport {
            version,
            platform: Platform::current().identifier(),
            configured: version.is_configured(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("{} {}", "Project:".bold(), version.project_name());
        println!("{} {}", "Revision:".bold(), display_or_unknown(version.revision_tag()));
        println!("{} {}", "Built:".bold(), display_or_unknown(version.build_timestamp()));
        println!("{} {}", "Platform:".bold(), report.platform);
        if !report.configured {
            println!("{}", "Update checks are disabled until a project name is set".yellow());
        }
        Ok(())
    }
}

fn display_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}
