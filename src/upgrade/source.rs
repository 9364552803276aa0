//! Release retrieval.
//!
//! [`ReleaseSource`] is the seam between the update protocol and the network.
//! [`HttpReleaseSource`] is the production implementation on top of
//! `reqwest`; tests substitute in-memory sources.
//!
//! # Host Layout
//!
//! ```text
//! {host}{project}/LATEST                                     manifest
//! {host}{project}/{prefix}.arch                              architecture list
//! {host}{project}/{prefix}/{project}_{os}_{arch}.bz2         payload
//! ```

use crate::constants::{ARCH_LIST_EXTENSION, LATEST_POINTER, PAYLOAD_EXTENSION, USER_AGENT};
use crate::core::UpdateError;
use crate::upgrade::config::UpdateConfig;
use bytes::Bytes;
use std::future::Future;
use tracing::debug;

/// Where the three release documents of a project live on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseUrls {
    host: String,
    project: String,
}

impl ReleaseUrls {
    /// `host` must end with `/` (see [`UpdateConfig::normalized_host`]).
    pub fn new(host: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            project: project.into(),
        }
    }

    /// URL of the `LATEST` manifest.
    pub fn manifest(&self) -> String {
        format!("{}{}/{}", self.host, self.project, LATEST_POINTER)
    }

    /// URL of the architecture list of the release at `archive_prefix`.
    pub fn architectures(&self, archive_prefix: &str) -> String {
        format!("{}{}/{}.{}", self.host, self.project, archive_prefix, ARCH_LIST_EXTENSION)
    }

    /// URL of the compressed executable for `platform` (`{os}_{arch}`).
    pub fn payload(&self, archive_prefix: &str, platform: &str) -> String {
        format!(
            "{host}{project}/{archive_prefix}/{project}_{platform}.{PAYLOAD_EXTENSION}",
            host = self.host,
            project = self.project,
        )
    }
}

/// Fetches the documents of one release.
///
/// Every method is a single request; failures are reported as
/// [`UpdateError::Transport`] or [`UpdateError::HttpStatus`]. Implementations
/// must not retry: an attempt that fails is simply abandoned.
pub trait ReleaseSource: Send + Sync + 'static {
    /// Body of `{project}/LATEST`.
    fn fetch_manifest(&self, project: &str) -> impl Future<Output = Result<String, UpdateError>> + Send;

    /// Body of `{project}/{archive_prefix}.arch`.
    fn fetch_architectures(
        &self,
        project: &str,
        archive_prefix: &str,
    ) -> impl Future<Output = Result<String, UpdateError>> + Send;

    /// Compressed executable for `platform`, as received.
    fn fetch_payload(
        &self,
        project: &str,
        archive_prefix: &str,
        platform: &str,
    ) -> impl Future<Output = Result<Bytes, UpdateError>> + Send;
}

/// [`ReleaseSource`] backed by a `reqwest` client with bounded timeouts.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    client: reqwest::Client,
    host: String,
}

impl HttpReleaseSource {
    /// Build a client using the host and timeouts of `config`.
    pub fn new(config: &UpdateConfig) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UpdateError::Transport {
                url: config.normalized_host(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            host: config.normalized_host(),
        })
    }

    fn urls(&self, project: &str) -> ReleaseUrls {
        ReleaseUrls::new(self.host.clone(), project)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, UpdateError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| UpdateError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_text(&self, url: &str) -> Result<String, UpdateError> {
        self.get(url).await?.text().await.map_err(|e| UpdateError::Transport {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })
    }
}

impl ReleaseSource for HttpReleaseSource {
    async fn fetch_manifest(&self, project: &str) -> Result<String, UpdateError> {
        self.get_text(&self.urls(project).manifest()).await
    }

    async fn fetch_architectures(
        &self,
        project: &str,
        archive_prefix: &str,
    ) -> Result<String, UpdateError> {
        self.get_text(&self.urls(project).architectures(archive_prefix)).await
    }

    async fn fetch_payload(
        &self,
        project: &str,
        archive_prefix: &str,
        platform: &str,
    ) -> Result<Bytes, UpdateError> {
        let url = self.urls(project).payload(archive_prefix, platform);
        let body = self.get(&url).await?.bytes().await.map_err(|e| UpdateError::Transport {
            url: url.clone(),
            reason: format!("failed to read body: {e}"),
        })?;
        debug!("Downloaded {} compressed bytes from {}", body.len(), url);
        Ok(body)
    }
}
