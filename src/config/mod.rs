//! Global configuration for liveupd.
//!
//! The config file is optional. It lives at:
//! - Unix/macOS: `~/.liveupd/config.toml`
//! - Windows: `%LOCALAPPDATA%\liveupd\config.toml`
//!
//! A different file can be selected with `--config` or `LIVEUPD_CONFIG`.
//!
//! # File Format
//!
//! ```toml
//! [update]
//! host = "https://dist.example.com/"
//! project_name = "myapp"
//! connect_timeout_secs = 15
//! request_timeout_secs = 300
//! check_deadline_secs = 600
//! restart_after_install = true
//! check_interval = 0
//! sweep_residue_on_start = true
//! ```

use crate::upgrade::config::UpdateConfig;
use crate::utils::platform::config_dir;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Contents of the global config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Update source and attempt behavior.
    #[serde(default, skip_serializing_if = "UpdateConfig::is_default")]
    pub update: UpdateConfig,
}

impl GlobalConfig {
    /// Load from the default location, or defaults if no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// A missing file yields the default config; an unreadable or invalid
    /// file is an error.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write to a specific file, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Default config file location.
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }
}
