//! In-memory release host.

use crate::core::UpdateError;
use crate::upgrade::source::{ReleaseSource, ReleaseUrls};
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the mock host answers for one document.
#[derive(Debug, Clone)]
enum Response<T> {
    Body(T),
    Status(u16),
    Unreachable,
}

impl<T: Clone> Response<T> {
    fn answer(&self, url: String) -> Result<T, UpdateError> {
        match self {
            Self::Body(body) => Ok(body.clone()),
            Self::Status(status) => Err(UpdateError::HttpStatus {
                url,
                status: *status,
            }),
            Self::Unreachable => Err(UpdateError::Transport {
                url,
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// [`ReleaseSource`] serving fixed documents and counting requests.
///
/// Documents that were never set answer `404`. Every request sleeps for the
/// configured delay while counted as in flight, so overlapping attempts show
/// up in [`max_in_flight`](Self::max_in_flight).
///
/// ```rust,no_run
/// use liveupd::test_utils::MockReleaseSource;
///
/// let source = MockReleaseSource::release(
///     "20240611153000 9f8e7d6 releases/20240611",
///     "linux_amd64 darwin_arm64",
///     b"compressed".to_vec(),
/// );
/// assert_eq!(source.manifest_fetches(), 0);
/// ```
#[derive(Debug)]
pub struct MockReleaseSource {
    manifest: Response<String>,
    architectures: Response<String>,
    payload: Response<Bytes>,
    delay: Duration,
    manifest_fetches: AtomicUsize,
    architecture_fetches: AtomicUsize,
    payload_fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockReleaseSource {
    fn default() -> Self {
        Self {
            manifest: Response::Status(404),
            architectures: Response::Status(404),
            payload: Response::Status(404),
            delay: Duration::ZERO,
            manifest_fetches: AtomicUsize::new(0),
            architecture_fetches: AtomicUsize::new(0),
            payload_fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockReleaseSource {
    /// A host with nothing published.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host publishing one complete release.
    pub fn release(manifest: &str, architectures: &str, payload: Vec<u8>) -> Self {
        Self::new().with_manifest(manifest).with_architectures(architectures).with_payload(payload)
    }

    /// A host that refuses every connection.
    pub fn unreachable() -> Self {
        Self {
            manifest: Response::Unreachable,
            architectures: Response::Unreachable,
            payload: Response::Unreachable,
            ..Self::default()
        }
    }

    /// Serve `body` as the `LATEST` manifest.
    #[must_use]
    pub fn with_manifest(mut self, body: impl Into<String>) -> Self {
        self.manifest = Response::Body(body.into());
        self
    }

    /// Serve `body` as the architecture list.
    #[must_use]
    pub fn with_architectures(mut self, body: impl Into<String>) -> Self {
        self.architectures = Response::Body(body.into());
        self
    }

    /// Serve `payload` as the compressed executable.
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Response::Body(Bytes::from(payload));
        self
    }

    /// Answer payload requests with `status`.
    #[must_use]
    pub fn with_payload_status(mut self, status: u16) -> Self {
        self.payload = Response::Status(status);
        self
    }

    /// Hold every request for `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of manifest requests served.
    pub fn manifest_fetches(&self) -> usize {
        self.manifest_fetches.load(Ordering::SeqCst)
    }

    /// Number of architecture list requests served.
    pub fn architecture_fetches(&self) -> usize {
        self.architecture_fetches.load(Ordering::SeqCst)
    }

    /// Number of payload requests served.
    pub fn payload_fetches(&self) -> usize {
        self.payload_fetches.load(Ordering::SeqCst)
    }

    /// Requests of any kind served.
    pub fn total_fetches(&self) -> usize {
        self.manifest_fetches() + self.architecture_fetches() + self.payload_fetches()
    }

    /// Highest number of requests ever in flight at once.
    ///
    /// Requests cancelled mid-delay stay counted as in flight.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn serve<T: Clone>(
        &self,
        counter: &AtomicUsize,
        url: String,
        response: &Response<T>,
    ) -> Result<T, UpdateError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response.answer(url)
    }
}

fn urls(project: &str) -> ReleaseUrls {
    ReleaseUrls::new("mock://releases/", project)
}

impl ReleaseSource for MockReleaseSource {
    async fn fetch_manifest(&self, project: &str) -> Result<String, UpdateError> {
        self.serve(&self.manifest_fetches, urls(project).manifest(), &self.manifest).await
    }

    async fn fetch_architectures(
        &self,
        project: &str,
        archive_prefix: &str,
    ) -> Result<String, UpdateError> {
        self.serve(
            &self.architecture_fetches,
            urls(project).architectures(archive_prefix),
            &self.architectures,
        )
        .await
    }

    async fn fetch_payload(
        &self,
        project: &str,
        archive_prefix: &str,
        platform: &str,
    ) -> Result<Bytes, UpdateError> {
        self.serve(
            &self.payload_fetches,
            urls(project).payload(archive_prefix, platform),
            &self.payload,
        )
        .await
    }
}
