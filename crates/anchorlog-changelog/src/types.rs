//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::version_start_anchor;

/// A parsed commit from conventional commit format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Original commit hash
    pub hash: String,
    /// Commit type (feat, fix, etc.)
    pub commit_type: String,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Whether this is a breaking change
    pub breaking: bool,
    /// Commit description
    pub description: String,
    /// Commit body
    pub body: Option<String>,
    /// Footer fields
    pub footers: Vec<Footer>,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl ParsedCommit {
    /// First seven characters of the hash
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }

    /// Text of the `BREAKING CHANGE` footer, if any
    pub fn breaking_note(&self) -> Option<&str> {
        self.footers
            .iter()
            .find(|f| {
                f.token.eq_ignore_ascii_case("BREAKING CHANGE")
                    || f.token.eq_ignore_ascii_case("BREAKING-CHANGE")
            })
            .map(|f| f.value.as_str())
    }
}

/// A footer field from a conventional commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footer {
    /// Footer token (e.g., "BREAKING CHANGE", "Fixes", "Refs")
    pub token: String,
    /// Footer value
    pub value: String,
}

/// A section in a changelog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,
    /// Commits in this section
    pub commits: Vec<ParsedCommit>,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            commits: Vec::new(),
        }
    }

    /// Add a commit to the section
    pub fn add_commit(&mut self, commit: ParsedCommit) {
        self.commits.push(commit);
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// A changelog entry for a version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Version string
    pub version: String,
    /// Release date
    pub date: DateTime<Utc>,
    /// Sections in this entry
    pub sections: Vec<Section>,
    /// Breaking changes (highlighted separately)
    pub breaking_changes: Vec<ParsedCommit>,
}

impl ChangelogEntry {
    /// Create a new changelog entry
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: Utc::now(),
            sections: Vec::new(),
            breaking_changes: Vec::new(),
        }
    }

    /// Set the date
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Add a section
    pub fn add_section(&mut self, section: Section) {
        if !section.is_empty() {
            self.sections.push(section);
        }
    }

    /// Add a breaking change
    pub fn add_breaking_change(&mut self, commit: ParsedCommit) {
        self.breaking_changes.push(commit);
    }

    /// Check if entry has any content
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.breaking_changes.is_empty()
    }
}

/// One version's rendered text, as placed in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSection {
    /// Version identifier the section is anchored under
    pub version: String,
    /// Rendered text with trailing newlines collapsed to one blank line
    pub body: String,
}

impl VersionSection {
    /// Create a section, normalizing the rendered text's trailing newlines
    pub fn new(version: impl Into<String>, text: &str) -> Self {
        let trimmed = text.trim_end_matches(['\r', '\n']);
        Self {
            version: version.into(),
            body: format!("{}\n\n", trimmed),
        }
    }

    /// The section with its anchor line, ready to be concatenated
    pub fn to_markdown(&self) -> String {
        let mut out = version_start_anchor(&self.version);
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, footers: Vec<Footer>) -> ParsedCommit {
        ParsedCommit {
            hash: hash.to_string(),
            commit_type: "feat".to_string(),
            scope: None,
            breaking: !footers.is_empty(),
            description: "add feature".to_string(),
            body: None,
            footers,
            author: "Test".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_section() {
        let mut section = Section::new("Features");
        assert!(section.is_empty());

        section.add_commit(commit("abc123", vec![]));
        assert!(!section.is_empty());
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(commit("abc1234567890", vec![]).short_hash(), "abc1234");
        assert_eq!(commit("abc", vec![]).short_hash(), "abc");
    }

    #[test]
    fn test_breaking_note() {
        let parsed = commit(
            "abc1234567890",
            vec![Footer {
                token: "BREAKING CHANGE".to_string(),
                value: "config keys renamed".to_string(),
            }],
        );
        assert_eq!(parsed.breaking_note(), Some("config keys renamed"));
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let mut entry = ChangelogEntry::new("1.0.0");
        entry.add_section(Section::new("Features"));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_section_normalizes_trailing_newlines() {
        assert_eq!(VersionSection::new("1.0.0", "a\n").body, "a\n\n");
        assert_eq!(VersionSection::new("1.0.0", "a\n\n\n\n").body, "a\n\n");
        assert_eq!(VersionSection::new("1.0.0", "a\r\n\r\n").body, "a\n\n");
        assert_eq!(VersionSection::new("1.0.0", "a").body, "a\n\n");
    }

    #[test]
    fn test_section_markdown_is_anchored() {
        let section = VersionSection::new("1.0.0", "## 1.0.0\n");
        assert_eq!(section.to_markdown(), "<a name=\"1.0.0\"></a>\n## 1.0.0\n\n");
    }
}
