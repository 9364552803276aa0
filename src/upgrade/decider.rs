//! Entry points deciding when an update attempt runs.
//!
//! The decider owns no state of its own beyond a shared handle to the
//! executor. Peers report the version they run through
//! [`UpdateDecider::signal_version`], which applies a cheap pre-filter and
//! hands worthwhile signals to a background task. Manual and periodic checks
//! go straight to the executor.

use crate::upgrade::executor::UpdateExecutor;
use crate::upgrade::installer::{FileOps, StdFileOps};
use crate::upgrade::source::ReleaseSource;
use crate::version::{LocalVersion, peer_is_newer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Decides whether observed versions warrant an update attempt.
///
/// Cheap to clone; clones share the executor and therefore its guard.
pub struct UpdateDecider<S, F = StdFileOps> {
    executor: Arc<UpdateExecutor<S, F>>,
}

impl<S, F> Clone for UpdateDecider<S, F> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<S: ReleaseSource, F: FileOps + 'static> UpdateDecider<S, F> {
    /// Take ownership of `executor`.
    pub fn new(executor: UpdateExecutor<S, F>) -> Self {
        Self::from_shared(Arc::new(executor))
    }

    /// Share an executor already held elsewhere.
    pub const fn from_shared(executor: Arc<UpdateExecutor<S, F>>) -> Self {
        Self { executor }
    }

    /// The executor attempts are delegated to.
    pub fn executor(&self) -> &Arc<UpdateExecutor<S, F>> {
        &self.executor
    }

    /// The version of the running binary.
    pub fn local_version(&self) -> &LocalVersion {
        self.executor.local_version()
    }

    /// Whether a peer running `revision_tag` built at `build_timestamp` is
    /// worth an update attempt.
    pub fn should_check(&self, revision_tag: &str, build_timestamp: &str) -> bool {
        peer_is_newer(self.local_version(), revision_tag, build_timestamp)
    }

    /// Report the version a peer runs.
    ///
    /// Returns immediately. If the peer looks newer, a full check runs on a
    /// background task whose result nobody observes. Must be called from
    /// within a Tokio runtime; outside one the signal is dropped with a
    /// warning.
    pub fn signal_version(&self, revision_tag: &str, build_timestamp: &str) {
        if !self.should_check(revision_tag, build_timestamp) {
            debug!(
                "Ignoring peer version {}/{} (local {})",
                build_timestamp,
                revision_tag,
                self.local_version()
            );
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    "Peer reports newer version {}/{} but no runtime is available to check",
                    build_timestamp, revision_tag
                );
                return;
            }
        };

        debug!("Peer reports newer version {}/{}, checking", build_timestamp, revision_tag);
        let executor = Arc::clone(&self.executor);
        // Detached; the outcome is only logged.
        drop(handle.spawn(async move {
            executor.check_for_update().await;
        }));
    }

    /// Run one full check and report whether an update was installed.
    ///
    /// See [`UpdateExecutor::check_for_update`].
    pub async fn check_for_update(&self) -> bool {
        self.executor.check_for_update().await
    }

    /// Check every `interval`, first one interval from now.
    ///
    /// A tick that falls due while a check is still running is delayed
    /// rather than bunched up. Abort the returned handle to stop.
    pub fn spawn_periodic(&self, interval: Duration) -> JoinHandle<()> {
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Periodic update check");
                executor.check_for_update().await;
            }
        })
    }
}
