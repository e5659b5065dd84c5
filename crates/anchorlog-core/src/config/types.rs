//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration for anchorlog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Changelog configuration
    pub changelog: ChangelogConfig,

    /// Git configuration
    pub git: GitConfig,
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path
    pub file: PathBuf,

    /// Inline header placed above the document-start anchor
    pub header: Option<String>,

    /// File holding the header, used when `header` is unset
    pub header_file: Option<PathBuf>,

    /// Trailing content for a changelog created from scratch
    pub footer: Option<String>,

    /// Release notes sidecar path
    pub notes_file: PathBuf,

    /// Commit message preset
    pub preset: String,

    /// Number of releases to render per run (0 renders every release)
    pub release_count: usize,

    /// Commit types to include
    #[serde(default)]
    pub types: HashMap<String, CommitTypeConfig>,

    /// Whether to include commit hashes
    pub include_hashes: bool,

    /// Whether to include authors
    pub include_authors: bool,

    /// Repository web URL used to link commit hashes
    pub repository_url: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        let mut types = HashMap::new();
        for (commit_type, section, hidden) in [
            ("feat", "Features", false),
            ("fix", "Bug Fixes", false),
            ("perf", "Performance", false),
            ("revert", "Reverts", false),
            ("docs", "Documentation", true),
            ("refactor", "Refactoring", true),
            ("test", "Tests", true),
            ("chore", "Chores", true),
        ] {
            types.insert(
                commit_type.to_string(),
                CommitTypeConfig {
                    section: section.to_string(),
                    hidden,
                },
            );
        }

        Self {
            file: PathBuf::from(super::defaults::DEFAULT_LOG_FILE),
            header: None,
            header_file: None,
            footer: None,
            notes_file: PathBuf::from(super::defaults::DEFAULT_NOTES_FILE),
            preset: super::defaults::DEFAULT_PRESET.to_string(),
            release_count: 1,
            types,
            include_hashes: true,
            include_authors: false,
            repository_url: None,
        }
    }
}

impl ChangelogConfig {
    /// Whether a commit type is rendered into the changelog
    pub fn is_visible(&self, commit_type: &str) -> bool {
        self.types.get(commit_type).is_some_and(|t| !t.hidden)
    }

    /// Section title for a commit type
    pub fn section_for(&self, commit_type: &str) -> Option<&str> {
        self.types.get(commit_type).map(|t| t.section.as_str())
    }
}

/// Configuration for a commit type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTypeConfig {
    /// Section header in changelog
    pub section: String,
    /// Whether to hide this type from changelog
    #[serde(default)]
    pub hidden: bool,
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Prefix stripped from tags to obtain version identifiers
    pub tag_prefix: String,

    /// Only consider commits touching this path
    pub commit_path: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "v".to_string(),
            commit_path: None,
        }
    }
}
