//! Git types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Commit message (first line)
    pub message: String,
    /// Full commit message body
    pub body: Option<String>,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = hash.chars().take(7).collect();

        Self {
            hash,
            short_hash,
            message: message.into(),
            body: None,
            author: author.into(),
            author_email: author_email.into(),
            timestamp,
        }
    }

    /// Set the commit body; blank bodies are dropped
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.trim().is_empty() { None } else { Some(body) };
        self
    }
}

/// A tag that names a released version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Commit hash the tag points to
    pub commit_hash: String,
    /// Version identifier: the tag name without its prefix
    pub version: String,
    /// Time of the tagged commit
    pub timestamp: DateTime<Utc>,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(
        name: impl Into<String>,
        commit_hash: impl Into<String>,
        version: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            commit_hash: commit_hash.into(),
            version: version.into(),
            timestamp,
        }
    }
}

/// Extract the version identifier from a tag name.
///
/// The prefix is stripped and the remainder must be a valid semantic
/// version; `None` otherwise. An empty prefix still tolerates a leading `v`.
pub fn version_from_tag(tag: &str, prefix: &str) -> Option<String> {
    let rest = tag.strip_prefix(prefix)?;
    let rest = if prefix.is_empty() {
        rest.strip_prefix('v').unwrap_or(rest)
    } else {
        rest
    };

    semver::Version::parse(rest).ok().map(|_| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_tag() {
        assert_eq!(version_from_tag("v1.0.0", "v"), Some("1.0.0".to_string()));
        assert_eq!(version_from_tag("1.0.0", ""), Some("1.0.0".to_string()));
        assert_eq!(version_from_tag("v2.1.0", ""), Some("2.1.0".to_string()));
        assert_eq!(
            version_from_tag("api@1.2.0-beta.1", "api@"),
            Some("1.2.0-beta.1".to_string())
        );
        assert_eq!(version_from_tag("v1.0", "v"), None);
        assert_eq!(version_from_tag("release-1.0.0", "v"), None);
        assert_eq!(version_from_tag("not-a-version", ""), None);
    }

    #[test]
    fn test_commit_info() {
        let commit = CommitInfo::new(
            "abc1234567890",
            "feat: add feature",
            "Author",
            "author@example.com",
            Utc::now(),
        )
        .with_body("\n");
        assert_eq!(commit.short_hash, "abc1234");
        assert_eq!(commit.message, "feat: add feature");
        assert!(commit.body.is_none());
    }
}
