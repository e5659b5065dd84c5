//! Release entry generation

use std::collections::HashMap;

use anchorlog_core::config::ChangelogConfig;
use anchorlog_git::CommitInfo;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::parser::{CommitParser, ConventionalParser, ParserConfig, Preset};
use crate::types::{ChangelogEntry, ParsedCommit, Section};

/// Commit types whose sections come first, in this order
const SECTION_ORDER: &[&str] = &["feat", "fix", "perf", "revert"];

/// Turns commits into rendered release text
pub struct ChangelogGenerator {
    parser: Box<dyn CommitParser>,
    formatter: Box<dyn ChangelogFormatter>,
    config: ChangelogConfig,
}

impl ChangelogGenerator {
    /// Create a generator whose parser follows `config.preset`
    pub fn new(config: ChangelogConfig) -> Self {
        let preset = config.preset.parse::<Preset>().unwrap_or_else(|err| {
            warn!(%err, "falling back to the angular preset");
            Preset::default()
        });

        let mut formatter = MarkdownFormatter::new();
        if let Some(url) = &config.repository_url {
            formatter = formatter.with_repo_url(url);
        }

        Self {
            parser: Box::new(ConventionalParser::with_config(ParserConfig::for_preset(
                preset,
            ))),
            formatter: Box::new(formatter),
            config,
        }
    }

    /// Build the entry for one release from its commits
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub fn generate(
        &self,
        version: &str,
        date: DateTime<Utc>,
        commits: &[CommitInfo],
    ) -> ChangelogEntry {
        info!(version, commit_count = commits.len(), "generating changelog entry");
        let mut entry = ChangelogEntry::new(version).with_date(date);

        let parsed: Vec<ParsedCommit> = commits
            .iter()
            .filter_map(|c| self.parser.parse(c))
            .filter(|c| self.parser.should_include(c))
            .collect();

        let mut grouped: HashMap<String, Vec<ParsedCommit>> = HashMap::new();
        for commit in parsed {
            if commit.breaking {
                entry.add_breaking_change(commit.clone());
            }
            if self.config.is_visible(&commit.commit_type) {
                grouped
                    .entry(commit.commit_type.clone())
                    .or_default()
                    .push(commit);
            }
        }

        let mut types: Vec<String> = grouped.keys().cloned().collect();
        types.sort_by_key(|t| {
            let rank = SECTION_ORDER
                .iter()
                .position(|known| *known == t.as_str())
                .unwrap_or(SECTION_ORDER.len());
            (rank, self.config.section_for(t).unwrap_or_default().to_string())
        });

        for commit_type in types {
            let Some(title) = self.config.section_for(&commit_type) else {
                continue;
            };
            let mut section = Section::new(title);
            for commit in grouped.remove(&commit_type).unwrap_or_default() {
                section.add_commit(commit);
            }
            entry.add_section(section);
        }

        debug!(
            section_count = entry.sections.len(),
            breaking_count = entry.breaking_changes.len(),
            "changelog sections built"
        );
        entry
    }

    /// Format a changelog entry to string
    pub fn format(&self, entry: &ChangelogEntry) -> String {
        self.formatter.format(entry, &self.config)
    }

    /// Generate and format in one step
    pub fn generate_formatted(
        &self,
        version: &str,
        date: DateTime<Utc>,
        commits: &[CommitInfo],
    ) -> String {
        let entry = self.generate(version, date, commits);
        self.format(&entry)
    }
}
