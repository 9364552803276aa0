//! Handing control to the freshly installed executable.

use std::io;
use std::path::Path;
use tracing::info;

/// Replaces the running process with the executable at a path.
///
/// A successful restart does not return. An `Ok(())` return means the
/// implementation chose not to restart; an error means it tried and failed.
pub trait Restarter: Send + Sync + 'static {
    /// Restart into `executable`, forwarding the current arguments.
    fn restart(&self, executable: &Path) -> io::Result<()>;
}

/// Re-executes the program with its original arguments.
///
/// Unix replaces the process image with `exec`, keeping the PID. Other
/// platforms spawn the new executable and exit the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecRestarter;

impl Restarter for ExecRestarter {
    fn restart(&self, executable: &Path) -> io::Result<()> {
        let mut command = std::process::Command::new(executable);
        command.args(std::env::args_os().skip(1));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Only returns on failure.
            Err(command.exec())
        }

        #[cfg(not(unix))]
        {
            command.spawn()?;
            std::process::exit(0)
        }
    }
}

/// Leaves the process running; the new version takes effect on next start.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRestart;

impl Restarter for NoRestart {
    fn restart(&self, executable: &Path) -> io::Result<()> {
        info!("Restart disabled; {} will run on next start", executable.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_restart_returns() {
        assert!(NoRestart.restart(Path::new("/nonexistent/myapp")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_restarter_reports_failure() {
        let err = ExecRestarter.restart(Path::new("/nonexistent/liveupd-test-binary")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
