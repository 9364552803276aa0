//! Remote release descriptors: the `LATEST` manifest and the per-release
//! architecture list.
//!
//! Both are single fetched text bodies that live for one update attempt.

use crate::core::UpdateError;
use std::collections::HashSet;
use std::fmt;

/// The release currently published under a project's `LATEST` pointer.
///
/// Wire format: one line, `{build_timestamp} {revision_tag} {archive_prefix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteManifest {
    /// Build timestamp of the published release.
    pub build_timestamp: String,
    /// Revision tag of the published release.
    pub revision_tag: String,
    /// Path segment identifying the release on the host.
    pub archive_prefix: String,
}

impl RemoteManifest {
    /// Parse a manifest body.
    ///
    /// The trimmed body must split on whitespace into exactly three tokens.
    /// Anything else is a hard [`UpdateError::ManifestParse`] carrying the
    /// raw body.
    pub fn parse(body: &str) -> Result<Self, UpdateError> {
        let tokens: Vec<&str> = body.split_whitespace().collect();
        match tokens.as_slice() {
            [build_timestamp, revision_tag, archive_prefix] => Ok(Self {
                build_timestamp: (*build_timestamp).to_string(),
                revision_tag: (*revision_tag).to_string(),
                archive_prefix: (*archive_prefix).to_string(),
            }),
            _ => Err(UpdateError::ManifestParse {
                raw: body.to_string(),
                tokens: tokens.len(),
            }),
        }
    }
}

impl fmt::Display for RemoteManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.build_timestamp, self.revision_tag)
    }
}

/// Platforms (`{os}_{arch}`) a release publishes binaries for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchitectureSet {
    platforms: HashSet<String>,
}

impl ArchitectureSet {
    /// Parse a whitespace-separated list of platform identifiers.
    ///
    /// An empty body yields an empty set; no token is rejected.
    pub fn parse(body: &str) -> Self {
        Self {
            platforms: body.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Whether `platform` has a published build.
    pub fn supports(&self, platform: &str) -> bool {
        self.platforms.contains(platform)
    }

    /// Number of distinct platforms listed.
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Whether no platform is listed.
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = RemoteManifest::parse("20240301000000 9f8e7d myapp/20240301-9f8e7d\n").unwrap();
        assert_eq!(manifest.build_timestamp, "20240301000000");
        assert_eq!(manifest.revision_tag, "9f8e7d");
        assert_eq!(manifest.archive_prefix, "myapp/20240301-9f8e7d");
    }

    #[test]
    fn test_parse_manifest_tolerates_mixed_whitespace() {
        let manifest = RemoteManifest::parse("  a\tb   c \r\n").unwrap();
        assert_eq!(manifest.build_timestamp, "a");
        assert_eq!(manifest.revision_tag, "b");
        assert_eq!(manifest.archive_prefix, "c");
    }

    #[test]
    fn test_parse_manifest_rejects_wrong_token_counts() {
        for body in ["", "   ", "a", "a b", "a b c d", "a b c\nd"] {
            match RemoteManifest::parse(body) {
                Err(UpdateError::ManifestParse { raw, tokens }) => {
                    assert_eq!(raw, body);
                    assert_eq!(tokens, body.split_whitespace().count());
                }
                other => panic!("expected parse failure for {body:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_architecture_set() {
        let set = ArchitectureSet::parse("linux_amd64 darwin_arm64\nwindows_amd64 ");
        assert_eq!(set.len(), 3);
        assert!(set.supports("linux_amd64"));
        assert!(set.supports("windows_amd64"));
        assert!(!set.supports("linux_arm64"));
        assert!(!set.supports("linux"));
    }

    #[test]
    fn test_empty_architecture_set() {
        let set = ArchitectureSet::parse("\n");
        assert!(set.is_empty());
        assert!(!set.supports(""));
    }
}
