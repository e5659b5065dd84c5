//! Markdown changelog formatter

use anchorlog_core::config::ChangelogConfig;
use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::{ChangelogEntry, ParsedCommit};

/// Markdown changelog formatter
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    /// Repository URL for commit links
    pub repo_url: Option<String>,
}

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set repository URL for links
    pub fn with_repo_url(mut self, url: impl Into<String>) -> Self {
        self.repo_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    fn commit_line(&self, commit: &ParsedCommit, config: &ChangelogConfig) -> String {
        let mut line = String::from("- ");
        if let Some(scope) = &commit.scope {
            line.push_str(&format!("**{}:** ", scope));
        }
        line.push_str(&commit.description);

        if config.include_hashes {
            let short_hash = commit.short_hash();
            match &self.repo_url {
                Some(repo_url) => line.push_str(&format!(
                    " ([{}]({}/commit/{}))",
                    short_hash, repo_url, commit.hash
                )),
                None => line.push_str(&format!(" ({})", short_hash)),
            }
        }

        if config.include_authors {
            line.push_str(&format!(" - {}", commit.author));
        }

        line.push('\n');
        line
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, entry, config), fields(version = %entry.version, section_count = entry.sections.len()))]
    fn format(&self, entry: &ChangelogEntry, config: &ChangelogConfig) -> String {
        let mut output = String::new();

        let date_str = entry.date.format("%Y-%m-%d").to_string();
        output.push_str(&format!("## [{}] - {}\n\n", entry.version, date_str));

        if !entry.breaking_changes.is_empty() {
            output.push_str("### ⚠ BREAKING CHANGES\n\n");
            for commit in &entry.breaking_changes {
                match commit.breaking_note() {
                    Some(note) => {
                        let note = note.replace('\n', " ");
                        output.push_str(&format!("- {}\n", note));
                    }
                    None => output.push_str(&self.commit_line(commit, config)),
                }
            }
            output.push('\n');
        }

        for section in entry.sections.iter().filter(|s| !s.is_empty()) {
            output.push_str(&format!("### {}\n\n", section.title));
            for commit in &section.commits {
                output.push_str(&self.commit_line(commit, config));
            }
            output.push('\n');
        }

        debug!(output_len = output.len(), "markdown changelog formatted");
        output
    }
}
