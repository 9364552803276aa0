use crate::constants::{NEW_SUFFIX, OLD_SUFFIX};
use crate::core::UpdateError;
use crate::utils::platform::hide_file;
use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Filesystem primitives used by the replacement sequence.
///
/// Only the steps whose failure changes the outcome go through this trait,
/// so tests can fail or observe them one at a time. Staging the new file is
/// plain `std::fs`.
pub trait FileOps: Send + Sync {
    /// Atomically rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Mark a file as hidden.
    fn hide(&self, path: &Path) -> io::Result<()>;
}

/// [`FileOps`] on the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn hide(&self, path: &Path) -> io::Result<()> {
        hide_file(path)
    }
}

/// Outcome of a committed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Canonical path now holding the new executable.
    pub path: PathBuf,
    /// The displaced executable, when it could not be removed.
    pub residue: Option<PathBuf>,
}

/// Replaces an executable on disk without ever leaving its path empty.
///
/// The replacement is two renames around a fully written staging file:
///
/// ```text
/// write  stream        -> .{name}.new     (original untouched)
/// rename {name}        -> .{name}.old     (first destructive step)
/// rename .{name}.new   -> {name}          (commit; on failure .old is moved back)
/// remove .{name}.old                      (cleanup; failure only hides it)
/// ```
///
/// Renaming is allowed on a running image where overwriting it in place is
/// not, and each rename is atomic on a single volume.
///
/// # Examples
///
/// ```rust,no_run
/// use liveupd::upgrade::ExecutableInstaller;
///
/// # fn example() -> Result<(), liveupd::core::UpdateError> {
/// let installer = ExecutableInstaller::for_current_exe()?;
/// let payload: &[u8] = b"\x7fELF...";
/// let report = installer.install(payload)?;
/// println!("installed at {}", report.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExecutableInstaller<F = StdFileOps> {
    target: PathBuf,
    ops: F,
}

impl ExecutableInstaller<StdFileOps> {
    /// Target an explicit executable path. Symlinks are resolved at install
    /// time.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            ops: StdFileOps,
        }
    }

    /// Target the executable of the running process.
    pub fn for_current_exe() -> Result<Self, UpdateError> {
        let exe = std::env::current_exe().map_err(|source| UpdateError::ExecutablePath { source })?;
        Ok(Self::new(exe))
    }
}

impl<F: FileOps> ExecutableInstaller<F> {
    /// Swap the filesystem primitives, keeping the target.
    pub fn with_file_ops<G: FileOps>(self, ops: G) -> ExecutableInstaller<G> {
        ExecutableInstaller {
            target: self.target,
            ops,
        }
    }

    /// The configured target, before symlink resolution.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The filesystem primitives in use.
    pub fn file_ops(&self) -> &F {
        &self.ops
    }

    /// Canonical path of the real executable file.
    ///
    /// Resolving symlinks matters: renaming the link itself would replace the
    /// link and leave the real file stale.
    pub fn resolve(&self) -> Result<PathBuf, UpdateError> {
        fs::canonicalize(&self.target).map_err(|source| UpdateError::ExecutablePath { source })
    }

    /// Replace the executable with the bytes read from `reader`.
    ///
    /// Returns once the new executable is at the original path. Removal of
    /// the displaced file is best effort and does not affect the result.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::ExecutablePath`]: target cannot be resolved
    /// - [`UpdateError::Staging`]: staging write failed, nothing moved
    /// - [`UpdateError::Displace`]: original could not be moved aside, nothing moved
    /// - [`UpdateError::Commit`]: new file could not be moved in, original restored
    /// - [`UpdateError::ExecutableLost`]: commit and restore both failed
    pub fn install<R: Read>(&self, reader: R) -> Result<InstallReport, UpdateError> {
        let exe = self.resolve()?;
        let new_path = residue_path(&exe, NEW_SUFFIX);
        let old_path = residue_path(&exe, OLD_SUFFIX);

        let written = stage_executable(&new_path, reader)?;
        debug!("Staged {} bytes at {}", written, new_path.display());

        self.ops.rename(&exe, &old_path).map_err(|source| UpdateError::Displace {
            from: exe.clone(),
            to: old_path.clone(),
            source,
        })?;

        if let Err(forward) = self.ops.rename(&new_path, &exe) {
            return Err(self.restore(&exe, &old_path, &new_path, forward));
        }

        info!("Installed new executable at {}", exe.display());

        let residue = self.discard_displaced(&old_path);
        Ok(InstallReport {
            path: exe,
            residue,
        })
    }

    /// Move the displaced executable back after a failed commit.
    fn restore(&self, exe: &Path, old_path: &Path, new_path: &Path, forward: io::Error) -> UpdateError {
        match self.ops.rename(old_path, exe) {
            Ok(()) => {
                warn!(
                    "Failed to move new executable into place ({}); restored {}",
                    forward,
                    exe.display()
                );
                UpdateError::Commit {
                    path: exe.to_path_buf(),
                    source: forward,
                }
            }
            Err(restore) => {
                let lost = UpdateError::ExecutableLost {
                    path: exe.to_path_buf(),
                    old_path: old_path.to_path_buf(),
                    new_path: new_path.to_path_buf(),
                    forward,
                    restore,
                };
                error!("CRITICAL: {}", lost);
                lost
            }
        }
    }

    /// Remove the displaced executable, hiding it when removal is refused.
    fn discard_displaced(&self, old_path: &Path) -> Option<PathBuf> {
        match self.ops.remove_file(old_path) {
            Ok(()) => None,
            Err(e) => {
                warn!("Could not remove {} ({}); hiding it instead", old_path.display(), e);
                if let Err(e) = self.ops.hide(old_path) {
                    warn!("Could not hide {}: {}", old_path.display(), e);
                }
                Some(old_path.to_path_buf())
            }
        }
    }

    /// Delete `.new`/`.old` files left next to the executable by earlier
    /// attempts. Returns how many were removed.
    ///
    /// Missing files are fine; files that cannot be deleted are logged and
    /// skipped.
    pub fn sweep_residue(&self) -> Result<usize, UpdateError> {
        let exe = self.resolve()?;
        let mut removed = 0;
        for path in [residue_path(&exe, NEW_SUFFIX), residue_path(&exe, OLD_SUFFIX)] {
            match self.ops.remove_file(&path) {
                Ok(()) => {
                    debug!("Removed update residue {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove update residue {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }
}

/// Hidden sibling of `exe`: `{dir}/.{name}.{suffix}`.
pub fn residue_path(exe: &Path, suffix: &str) -> PathBuf {
    let name = exe.file_name().unwrap_or_default().to_string_lossy();
    exe.with_file_name(format!(".{name}.{suffix}"))
}

/// Write the whole stream to `path`, executable from creation.
fn stage_executable<R: Read>(path: &Path, mut reader: R) -> Result<u64, UpdateError> {
    let staging_error = |source| UpdateError::Staging {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    let mut file = options.open(path).map_err(staging_error)?;

    // `mode` only applies on creation; a leftover file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o755)).map_err(staging_error)?;
    }

    let written = io::copy(&mut reader, &mut file).map_err(staging_error)?;
    file.sync_all().map_err(staging_error)?;
    Ok(written)
}
