//! Setup shared by the CLI commands.

use crate::config::GlobalConfig;
use crate::upgrade::{
    CheckOutcome, ExecutableInstaller, HttpReleaseSource, NoRestart, UpdateConfig, UpdateExecutor,
    UpdateGuard,
};
use crate::version::LocalVersion;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Configuration and version every command runs against.
#[derive(Debug, Clone)]
pub struct CommandContext {
    config: GlobalConfig,
    local: LocalVersion,
}

impl CommandContext {
    /// Load the global config and apply its project override to the
    /// build-time version.
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = GlobalConfig::load_with_optional(config_path).await?;
        Ok(Self::new(config, LocalVersion::from_build_env()))
    }

    /// Build a context from explicit parts.
    pub fn new(config: GlobalConfig, local: LocalVersion) -> Self {
        let local = match config.update.project_name.as_deref() {
            Some(project) if !project.trim().is_empty() => local.with_project_name(project.trim()),
            _ => local,
        };
        Self {
            config,
            local,
        }
    }

    /// Update settings from the config file.
    pub fn update_config(&self) -> &UpdateConfig {
        &self.config.update
    }

    /// Version of this binary, with the configured project name.
    pub fn local_version(&self) -> &LocalVersion {
        &self.local
    }

    /// Executor targeting this binary's own executable.
    pub fn executor(&self) -> Result<UpdateExecutor<HttpReleaseSource>> {
        let update = self.update_config();
        let source = HttpReleaseSource::new(update).context("Failed to set up release source")?;
        let installer = ExecutableInstaller::for_current_exe()?;

        let executor = UpdateExecutor::new(self.local.clone(), source, installer, UpdateGuard::new())
            .with_check_deadline(update.check_deadline());

        Ok(if update.restart_after_install {
            executor
        } else {
            executor.with_restarter(NoRestart)
        })
    }

    /// Executor for a command that is about to check, with residue of
    /// earlier attempts already swept when the config asks for it.
    pub async fn prepared_executor(&self) -> Result<UpdateExecutor<HttpReleaseSource>> {
        let executor = self.executor()?;
        if self.update_config().sweep_residue_on_start {
            executor.sweep_residue().await;
        }
        Ok(executor)
    }
}

/// Print the user-facing summary of one update attempt.
pub fn print_outcome(outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::NotConfigured {
            project,
        } => {
            println!(
                "{}",
                format!("Update check skipped: project not configured ('{project}')").yellow()
            );
        }
        CheckOutcome::FetchFailed(e) => {
            println!("{} {}", "Update check failed:".red(), e);
        }
        CheckOutcome::InvalidManifest(e) => {
            println!("{} {}", "Release manifest rejected:".red(), e);
        }
        CheckOutcome::UpToDate {
            revision_tag,
        } => {
            println!("{}", format!("Already up to date ({revision_tag})").green());
        }
        CheckOutcome::UnsupportedPlatform {
            platform,
        } => {
            println!("No update published for {platform}");
        }
        CheckOutcome::InstallFailed(e) => {
            println!("{} {}", "Update install failed:".red(), e);
        }
        CheckOutcome::Installed {
            manifest,
            report,
        } => {
            println!(
                "{}",
                format!("Installed {} at {}", manifest, report.path.display()).green()
            );
            if let Some(residue) = &report.residue {
                println!("Previous executable left at {}", residue.display());
            }
        }
    }
}
