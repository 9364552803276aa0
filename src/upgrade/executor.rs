use crate::constants::default_check_deadline;
use crate::core::UpdateError;
use crate::upgrade::guard::UpdateGuard;
use crate::upgrade::installer::{ExecutableInstaller, FileOps, InstallReport, StdFileOps};
use crate::upgrade::restart::{ExecRestarter, Restarter};
use crate::upgrade::source::ReleaseSource;
use crate::utils::platform::Platform;
use crate::version::{ArchitectureSet, LocalVersion, RemoteManifest};
use bytes::{Buf, Bytes};
use bzip2::read::BzDecoder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How one update attempt ended.
///
/// Every variant corresponds to exactly one operational log line emitted by
/// [`UpdateExecutor::run_check`].
#[derive(Debug)]
pub enum CheckOutcome {
    /// The project name is unset or still the placeholder.
    NotConfigured {
        /// The rejected project name.
        project: String,
    },
    /// A fetch failed or the fetch phase ran past its deadline.
    FetchFailed(UpdateError),
    /// The `LATEST` manifest was malformed.
    InvalidManifest(UpdateError),
    /// The published revision is the one already running.
    UpToDate {
        /// The shared revision tag.
        revision_tag: String,
    },
    /// The release has no build for this platform.
    UnsupportedPlatform {
        /// Local `{os}_{arch}` identifier.
        platform: String,
    },
    /// Writing or swapping the executable failed.
    InstallFailed(UpdateError),
    /// The new executable is in place.
    Installed {
        /// Release that was installed.
        manifest: RemoteManifest,
        /// Where it was installed.
        report: InstallReport,
    },
}

impl CheckOutcome {
    /// Whether a new executable was installed.
    pub const fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The underlying error, for outcomes caused by one.
    pub const fn error(&self) -> Option<&UpdateError> {
        match self {
            Self::FetchFailed(e) | Self::InvalidManifest(e) | Self::InstallFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Collapse into a `Result` for callers that treat every incomplete
    /// check as a failure.
    ///
    /// Up to date is `Ok(None)`, an install is `Ok(Some(report))`. Everything
    /// else, including an unsupported platform, becomes the error describing
    /// it.
    pub fn into_result(self) -> Result<Option<InstallReport>, UpdateError> {
        match self {
            Self::UpToDate { .. } => Ok(None),
            Self::Installed {
                report, ..
            } => Ok(Some(report)),
            Self::NotConfigured {
                project,
            } => Err(UpdateError::NotConfigured {
                project,
            }),
            Self::UnsupportedPlatform {
                platform,
            } => Err(UpdateError::UnsupportedPlatform {
                platform,
            }),
            Self::FetchFailed(e) | Self::InvalidManifest(e) | Self::InstallFailed(e) => Err(e),
        }
    }
}

/// A release that passed every check and is ready to install.
struct FetchedRelease {
    manifest: RemoteManifest,
    payload: Bytes,
}

/// Runs update attempts: fetch manifest, architecture list and payload, then
/// replace the executable and restart.
///
/// Attempts are serialized through the injected [`UpdateGuard`], held for the
/// entire attempt. Nothing below [`check_for_update`](Self::check_for_update)
/// escapes as an error; every branch ends in one log line and a
/// [`CheckOutcome`].
///
/// # Examples
///
/// ```rust,no_run
/// use liveupd::config::GlobalConfig;
/// use liveupd::upgrade::{ExecutableInstaller, HttpReleaseSource, UpdateExecutor, UpdateGuard};
/// use liveupd::version::LocalVersion;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = GlobalConfig::load().await?;
/// let executor = UpdateExecutor::new(
///     LocalVersion::from_build_env(),
///     HttpReleaseSource::new(&config.update)?,
///     ExecutableInstaller::for_current_exe()?,
///     UpdateGuard::new(),
/// );
/// if !executor.check_for_update().await {
///     println!("no update installed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct UpdateExecutor<S, F = StdFileOps> {
    local: LocalVersion,
    platform: Platform,
    source: S,
    installer: Arc<ExecutableInstaller<F>>,
    restarter: Box<dyn Restarter>,
    guard: UpdateGuard,
    check_deadline: Duration,
}

impl<S: ReleaseSource, F: FileOps + 'static> UpdateExecutor<S, F> {
    /// Create an executor for the running platform that restarts via
    /// [`ExecRestarter`] after a successful install.
    pub fn new(
        local: LocalVersion,
        source: S,
        installer: ExecutableInstaller<F>,
        guard: UpdateGuard,
    ) -> Self {
        Self {
            local,
            platform: Platform::current(),
            source,
            installer: Arc::new(installer),
            restarter: Box::new(ExecRestarter),
            guard,
            check_deadline: default_check_deadline(),
        }
    }

    /// Use a different restart strategy.
    #[must_use]
    pub fn with_restarter(mut self, restarter: impl Restarter) -> Self {
        self.restarter = Box::new(restarter);
        self
    }

    /// Match releases against a different platform identifier.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Bound the fetch phase of each attempt.
    #[must_use]
    pub fn with_check_deadline(mut self, deadline: Duration) -> Self {
        self.check_deadline = deadline;
        self
    }

    /// The version of the running binary.
    pub const fn local_version(&self) -> &LocalVersion {
        &self.local
    }

    /// The platform releases are matched against.
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The guard serializing this executor's attempts.
    pub const fn guard(&self) -> &UpdateGuard {
        &self.guard
    }

    /// The release source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The installer targeting the executable.
    pub fn installer(&self) -> &ExecutableInstaller<F> {
        &self.installer
    }

    /// Run one attempt and report whether an update was installed.
    ///
    /// On success the process is normally replaced before this returns.
    /// `false` covers every other outcome.
    pub async fn check_for_update(&self) -> bool {
        self.run_check().await.is_installed()
    }

    /// Run one attempt and report how it ended.
    ///
    /// Waits for any attempt already holding the guard, then performs its
    /// own full attempt.
    pub async fn run_check(&self) -> CheckOutcome {
        let _permit = self.guard.acquire().await;
        debug!("Acquired update guard");
        self.attempt().await
    }

    async fn attempt(&self) -> CheckOutcome {
        if !self.local.is_configured() {
            error!(
                "Update check failed to run, project not properly configured ('{}')",
                self.local.project_name()
            );
            return CheckOutcome::NotConfigured {
                project: self.local.project_name().to_string(),
            };
        }

        let fetched = match tokio::time::timeout(self.check_deadline, self.fetch_release()).await {
            Ok(Ok(release)) => release,
            Ok(Err(outcome)) => return outcome,
            Err(_) => {
                let err = UpdateError::Timeout {
                    after_secs: self.check_deadline.as_secs(),
                };
                error!("Update check failed: {}", err);
                return CheckOutcome::FetchFailed(err);
            }
        };

        let FetchedRelease { manifest, payload } = fetched;
        let report = match self.install(payload).await {
            Ok(report) => report,
            Err(err) => {
                error!("Failed to install update: {}", err);
                return CheckOutcome::InstallFailed(err);
            }
        };

        info!("Program upgraded to {}, restarting", manifest);
        if let Err(e) = self.restarter.restart(&report.path) {
            error!(
                "Restart into {} failed: {}; the new version runs on next start",
                report.path.display(),
                e
            );
        }

        CheckOutcome::Installed { manifest, report }
    }

    /// Fetch and vet the latest release. Early exits carry their outcome.
    async fn fetch_release(&self) -> Result<FetchedRelease, CheckOutcome> {
        let project = self.local.project_name();

        let body = self.source.fetch_manifest(project).await.map_err(|err| {
            error!("Update check failed to fetch latest version: {}", err);
            CheckOutcome::FetchFailed(err)
        })?;

        let manifest = RemoteManifest::parse(&body).map_err(|err| {
            error!("{}", err);
            CheckOutcome::InvalidManifest(err)
        })?;

        if self.local.is_same_revision(&manifest.revision_tag) {
            info!("Current version is up to date ({})", self.local.revision_tag());
            return Err(CheckOutcome::UpToDate {
                revision_tag: manifest.revision_tag,
            });
        }

        info!("New version found {} (current: {}) - downloading...", manifest, self.local);

        let body = self
            .source
            .fetch_architectures(project, &manifest.archive_prefix)
            .await
            .map_err(|err| {
                error!("Update check failed to get architecture list: {}", err);
                CheckOutcome::FetchFailed(err)
            })?;

        let platform = self.platform.identifier();
        if !ArchitectureSet::parse(&body).supports(&platform) {
            info!("No update available for {}", platform);
            return Err(CheckOutcome::UnsupportedPlatform { platform });
        }

        let payload = self
            .source
            .fetch_payload(project, &manifest.archive_prefix, &platform)
            .await
            .map_err(|err| {
                error!("Update check failed to download update: {}", err);
                CheckOutcome::FetchFailed(err)
            })?;

        Ok(FetchedRelease { manifest, payload })
    }

    /// Decompress and install on the blocking pool.
    ///
    /// Not subject to the fetch deadline: once the renames start they run to
    /// completion.
    async fn install(&self, payload: Bytes) -> Result<InstallReport, UpdateError> {
        let installer = Arc::clone(&self.installer);
        tokio::task::spawn_blocking(move || installer.install(BzDecoder::new(payload.reader())))
            .await
            .map_err(|e| UpdateError::Task {
                reason: e.to_string(),
            })?
    }

    /// Remove residue of earlier attempts, logging rather than failing.
    ///
    /// Takes the guard so it never races an install in progress.
    pub async fn sweep_residue(&self) -> usize {
        let _permit = self.guard.acquire().await;
        match self.installer.sweep_residue() {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Skipping residue sweep: {}", e);
                0
            }
        }
    }
}
