//! Platform-specific utilities and cross-platform compatibility helpers
//!
//! Covers what the updater needs to know about the host: its `{os}_{arch}`
//! identifier as published in release architecture lists, where per-user
//! configuration lives, and how a file is marked hidden.
//!
//! # Examples
//!
//! ```rust
//! use liveupd::utils::platform::Platform;
//!
//! let platform = Platform::current();
//! println!("payload suffix: {}", platform.identifier());
//! ```
//!
//! # Platform Identifiers
//!
//! Release hosts publish payloads under Go's `GOOS_GOARCH` names, so the
//! names from [`std::env::consts`] are translated:
//!
//! | Host | Rust target | Identifier |
//! |------|-------------|------------|
//! | Linux x86-64 | `linux` / `x86_64` | `linux_amd64` |
//! | Linux ARM64 | `linux` / `aarch64` | `linux_arm64` |
//! | macOS Apple Silicon | `macos` / `aarch64` | `darwin_arm64` |
//! | Windows x86 | `windows` / `x86` | `windows_386` |

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Operating system and CPU architecture of a build, in release-host naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Operating system name, e.g. `darwin`.
    pub os: String,
    /// CPU architecture name, e.g. `amd64`.
    pub arch: String,
}

impl Platform {
    /// Create a platform from names already in release-host form.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Translate a Rust target (`std::env::consts` names) into release-host
    /// names. Unknown names pass through unchanged.
    #[must_use]
    pub fn from_target(os: &str, arch: &str, little_endian: bool) -> Self {
        Self::new(release_os(os), release_arch(arch, little_endian))
    }

    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::from_target(
            std::env::consts::OS,
            std::env::consts::ARCH,
            cfg!(target_endian = "little"),
        )
    }

    /// The `{os}_{arch}` identifier matched against release architecture lists.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

fn release_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn release_arch(arch: &str, little_endian: bool) -> &str {
    match (arch, little_endian) {
        ("x86_64", _) => "amd64",
        ("x86", _) => "386",
        ("aarch64", _) => "arm64",
        ("loongarch64", _) => "loong64",
        ("wasm32", _) => "wasm",
        ("powerpc64", true) => "ppc64le",
        ("powerpc64", false) => "ppc64",
        ("mips", true) => "mipsle",
        ("mips64", true) => "mips64le",
        (other, _) => other,
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the home directory of the current user.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Returns the directory holding the per-user liveupd configuration.
///
/// - Windows: `%LOCALAPPDATA%\liveupd`
/// - elsewhere: `~/.liveupd`
///
/// # Errors
///
/// Returns an error if the base directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    if is_windows() {
        Ok(dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
            .join("liveupd"))
    } else {
        Ok(get_home_dir()?.join(".liveupd"))
    }
}

/// Mark a file as hidden.
///
/// On Unix a leading dot already hides the file, so this is a no-op. On
/// Windows the hidden attribute is set with `attrib +h`.
pub fn hide_file(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        let status = std::process::Command::new("attrib")
            .arg("+h")
            .arg(path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "attrib +h exited with {:?}",
                status.code()
            )));
        }
    }
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_names_map_to_release_names() {
        let cases = [
            ("linux", "x86_64", true, "linux_amd64"),
            ("linux", "aarch64", true, "linux_arm64"),
            ("linux", "x86", true, "linux_386"),
            ("linux", "arm", true, "linux_arm"),
            ("linux", "riscv64", true, "linux_riscv64"),
            ("linux", "s390x", false, "linux_s390x"),
            ("linux", "powerpc64", true, "linux_ppc64le"),
            ("linux", "powerpc64", false, "linux_ppc64"),
            ("linux", "mips64", true, "linux_mips64le"),
            ("linux", "loongarch64", true, "linux_loong64"),
            ("macos", "x86_64", true, "darwin_amd64"),
            ("macos", "aarch64", true, "darwin_arm64"),
            ("windows", "x86_64", true, "windows_amd64"),
            ("windows", "x86", true, "windows_386"),
            ("freebsd", "x86_64", true, "freebsd_amd64"),
        ];
        for (os, arch, little_endian, expected) in cases {
            assert_eq!(
                Platform::from_target(os, arch, little_endian).identifier(),
                expected,
                "{os}/{arch}"
            );
        }
    }

    #[test]
    fn test_current_platform_identifier() {
        let platform = Platform::current();
        assert_eq!(platform.to_string(), platform.identifier());
        assert_ne!(platform.os, "macos");
        assert_ne!(platform.arch, "x86_64");
        assert_ne!(platform.arch, "aarch64");
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        assert_eq!(platform.identifier(), "linux_amd64");
    }

    #[test]
    fn test_new_keeps_release_names() {
        assert_eq!(Platform::new("linux", "amd64").identifier(), "linux_amd64");
    }

    #[test]
    fn test_is_windows() {
        assert_eq!(is_windows(), cfg!(windows));
    }

    #[cfg(unix)]
    #[test]
    fn test_hide_file_is_noop_on_unix() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join(".residue");
        std::fs::write(&file, b"x").unwrap();
        hide_file(&file).unwrap();
        assert!(file.exists());
    }
}
