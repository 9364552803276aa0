//! Fixtures for exercising the installer and executor without a network or
//! a real restart.

use crate::upgrade::installer::{FileOps, StdFileOps};
use crate::upgrade::restart::Restarter;
use bzip2::Compression;
use bzip2::write::BzEncoder;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Write `content` to `dir/name` and mark it executable.
pub fn fake_executable(dir: &Path, name: &str, content: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path)
}

/// Compress `content` the way release payloads are published.
pub fn bzip2_compress(content: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    encoder.finish()
}

/// [`Restarter`] that records where it was asked to restart and returns.
///
/// Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingRestarter {
    restarts: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingRestarter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths passed to each restart, in order.
    pub fn restarts(&self) -> Vec<PathBuf> {
        self.restarts.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Restarter for RecordingRestarter {
    fn restart(&self, executable: &Path) -> io::Result<()> {
        if let Ok(mut restarts) = self.restarts.lock() {
            restarts.push(executable.to_path_buf());
        }
        Ok(())
    }
}

/// [`FileOps`] on the real filesystem with injected failures.
///
/// Renames are numbered from 1 in call order; the installer's displace
/// rename is 1, the commit rename is 2 and a restore rename is 3.
#[derive(Debug, Default)]
pub struct FailingFileOps {
    failing_renames: HashSet<usize>,
    refuse_removal: bool,
    renames: AtomicUsize,
    hides: AtomicUsize,
}

impl FailingFileOps {
    /// Fail the renames with the given 1-based call numbers.
    pub fn failing_renames(calls: &[usize]) -> Self {
        Self {
            failing_renames: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Refuse every removal, as when the image is locked.
    pub fn refusing_removal() -> Self {
        Self {
            refuse_removal: true,
            ..Self::default()
        }
    }

    /// Renames attempted so far, failed ones included.
    pub fn rename_calls(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }

    /// Hide calls so far.
    pub fn hide_calls(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }
}

impl FileOps for FailingFileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let call = self.renames.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_renames.contains(&call) {
            return Err(io::Error::other(format!("injected failure of rename #{call}")));
        }
        StdFileOps.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.refuse_removal {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "image is locked"));
        }
        StdFileOps.remove_file(path)
    }

    fn hide(&self, path: &Path) -> io::Result<()> {
        self.hides.fetch_add(1, Ordering::SeqCst);
        StdFileOps.hide(path)
    }
}

/// State of the executable directory right after one rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSample {
    /// Destination of the rename.
    pub to: PathBuf,
    /// A file exists at the executable path.
    pub executable_present: bool,
    /// A file exists at the displaced `.old` path.
    pub displaced_present: bool,
}

impl RenameSample {
    /// Whether a complete executable could be run or recovered at this point.
    pub const fn has_runnable_copy(&self) -> bool {
        self.executable_present || self.displaced_present
    }
}

/// [`FileOps`] on the real filesystem that inspects the executable
/// directory after every rename.
#[derive(Debug)]
pub struct SamplingFileOps {
    executable: PathBuf,
    displaced: PathBuf,
    samples: Mutex<Vec<RenameSample>>,
}

impl SamplingFileOps {
    /// Watch the canonical executable path `executable`.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        let displaced = crate::upgrade::installer::residue_path(&executable, crate::constants::OLD_SUFFIX);
        Self {
            executable,
            displaced,
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Samples taken so far, one per successful rename.
    pub fn samples(&self) -> Vec<RenameSample> {
        self.samples.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl FileOps for SamplingFileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        StdFileOps.rename(from, to)?;
        let sample = RenameSample {
            to: to.to_path_buf(),
            executable_present: self.executable.is_file(),
            displaced_present: self.displaced.is_file(),
        };
        if let Ok(mut samples) = self.samples.lock() {
            samples.push(sample);
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        StdFileOps.remove_file(path)
    }

    fn hide(&self, path: &Path) -> io::Result<()> {
        StdFileOps.hide(path)
    }
}
