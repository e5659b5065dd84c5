//! Conventional commit message parser
//!
//! Handles the Angular convention and Conventional Commits 1.0:
//! https://www.conventionalcommits.org/

use regex::Regex;
use std::sync::LazyLock;

use super::{CommitParser, ParserConfig, Preset};
use crate::types::{Footer, ParsedCommit};
use anchorlog_git::CommitInfo;

/// Header regex for Conventional Commits (accepts the `!` marker)
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<description>.+)$",
    )
    .expect("Invalid regex")
});

/// Header regex for the Angular convention
static ANGULAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]*)\))?: (?P<description>.+)$")
        .expect("Invalid regex")
});

/// `Revert "<header>"` as written by `git revert`
static REVERT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^Revert "(?P<header>.+)"$"#).expect("Invalid regex"));

/// Regex for parsing footer lines
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING CHANGE|[A-Za-z-]+): (?P<value>.+)$").expect("Invalid regex")
});

/// Parser for conventional commit messages
#[derive(Default)]
pub struct ConventionalParser {
    config: ParserConfig,
}

struct ParsedMessage {
    commit_type: String,
    scope: Option<String>,
    breaking: bool,
    description: String,
    body: Option<String>,
    footers: Vec<Footer>,
}

impl ConventionalParser {
    /// Create a parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    fn header_regex(&self) -> &'static Regex {
        match self.config.preset {
            Preset::Angular => &ANGULAR_REGEX,
            Preset::Conventional => &CONVENTIONAL_REGEX,
        }
    }

    /// Parse a commit message
    fn parse_message(&self, message: &str, body: Option<&str>) -> Option<ParsedMessage> {
        if let Some(caps) = REVERT_REGEX.captures(message) {
            return Some(ParsedMessage {
                commit_type: "revert".to_string(),
                scope: None,
                breaking: false,
                description: caps.name("header")?.as_str().to_string(),
                body: body.map(str::to_string),
                footers: Vec::new(),
            });
        }

        let caps = self.header_regex().captures(message)?;

        let commit_type = caps.name("type")?.as_str().to_lowercase();
        let scope = caps
            .name("scope")
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty());
        let breaking_marker = caps.name("breaking").is_some();
        let description = caps.name("description")?.as_str().to_string();

        let (body_text, footers) = body.map(parse_body).unwrap_or_default();

        let breaking_in_footer = footers.iter().any(|f| {
            f.token.eq_ignore_ascii_case("BREAKING CHANGE")
                || f.token.eq_ignore_ascii_case("BREAKING-CHANGE")
        });

        Some(ParsedMessage {
            commit_type,
            scope,
            breaking: breaking_marker || breaking_in_footer,
            description,
            body: body_text,
            footers,
        })
    }
}

/// Split a body into free text and trailing footers
fn parse_body(body: &str) -> (Option<String>, Vec<Footer>) {
    let mut footers: Vec<Footer> = Vec::new();
    let mut body_lines = Vec::new();
    let mut in_footer = false;

    for line in body.lines() {
        if let Some(caps) = FOOTER_REGEX.captures(line) {
            in_footer = true;
            footers.push(Footer {
                token: caps["token"].to_string(),
                value: caps["value"].to_string(),
            });
        } else if in_footer && line.starts_with(' ') {
            // Continuation of previous footer
            if let Some(last) = footers.last_mut() {
                last.value.push('\n');
                last.value.push_str(line.trim());
            }
        } else if !in_footer {
            body_lines.push(line);
        }
    }

    let body_text = Some(body_lines.join("\n").trim().to_string()).filter(|b| !b.is_empty());
    (body_text, footers)
}

impl CommitParser for ConventionalParser {
    fn parse(&self, commit: &CommitInfo) -> Option<ParsedCommit> {
        if !self.config.include_merges && commit.message.starts_with("Merge ") {
            return None;
        }

        let parsed = self.parse_message(&commit.message, commit.body.as_deref())?;

        Some(ParsedCommit {
            hash: commit.hash.clone(),
            commit_type: parsed.commit_type,
            scope: parsed.scope,
            breaking: parsed.breaking,
            description: parsed.description,
            body: parsed.body,
            footers: parsed.footers,
            author: commit.author.clone(),
            timestamp: commit.timestamp,
        })
    }

    fn should_include(&self, commit: &ParsedCommit) -> bool {
        if self.config.exclude_types.contains(&commit.commit_type) {
            return false;
        }

        // Empty include list means everything not excluded
        self.config.include_types.is_empty()
            || self.config.include_types.contains(&commit.commit_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_commit(message: &str) -> CommitInfo {
        CommitInfo::new(
            "abc1234567890",
            message,
            "Test Author",
            "test@example.com",
            Utc::now(),
        )
    }

    fn conventional() -> ConventionalParser {
        ConventionalParser::with_config(ParserConfig::for_preset(Preset::Conventional))
    }

    #[test]
    fn test_parse_simple_feat() {
        let parser = ConventionalParser::new();
        let parsed = parser.parse(&make_commit("feat: add new feature")).unwrap();

        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.description, "add new feature");
        assert!(parsed.scope.is_none());
        assert!(!parsed.breaking);
    }

    #[test]
    fn test_parse_with_scope() {
        let parser = ConventionalParser::new();
        let parsed = parser
            .parse(&make_commit("fix(parser): handle edge case"))
            .unwrap();

        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.scope, Some("parser".to_string()));
        assert_eq!(parsed.description, "handle edge case");
    }

    #[test]
    fn test_breaking_marker_depends_on_preset() {
        let commit = make_commit("refactor(core)!: major refactoring");

        assert!(ConventionalParser::new().parse(&commit).is_none());

        let parsed = conventional().parse(&commit).unwrap();
        assert_eq!(parsed.scope, Some("core".to_string()));
        assert!(parsed.breaking);
    }

    #[test]
    fn test_parse_non_conventional() {
        let parser = ConventionalParser::new();
        assert!(parser
            .parse(&make_commit("Just a regular commit message"))
            .is_none());
    }

    #[test]
    fn test_parse_revert() {
        let parser = ConventionalParser::new();
        let parsed = parser
            .parse(&make_commit("Revert \"feat: add new feature\""))
            .unwrap();

        assert_eq!(parsed.commit_type, "revert");
        assert_eq!(parsed.description, "feat: add new feature");
    }

    #[test]
    fn test_parse_with_footer() {
        let parser = ConventionalParser::new();
        let commit = make_commit("feat: add feature").with_body("Body text\n\nRefs: #123\nFixes: #456");

        let parsed = parser.parse(&commit).unwrap();
        assert_eq!(parsed.body.as_deref(), Some("Body text"));
        assert_eq!(parsed.footers.len(), 2);
        assert_eq!(parsed.footers[0].token, "Refs");
        assert_eq!(parsed.footers[0].value, "#123");
    }

    #[test]
    fn test_breaking_change_footer() {
        let parser = ConventionalParser::new();
        let commit = make_commit("feat: add feature")
            .with_body("BREAKING CHANGE: This breaks everything\n  and keeps going");

        let parsed = parser.parse(&commit).unwrap();
        assert!(parsed.breaking);
        assert_eq!(
            parsed.breaking_note(),
            Some("This breaks everything\nand keeps going")
        );
    }

    #[test]
    fn test_merge_commits_skipped() {
        let parser = ConventionalParser::new();
        assert!(parser
            .parse(&make_commit("Merge branch 'main' into feature"))
            .is_none());
    }

    #[test]
    fn test_should_include_with_excludes() {
        let parser = ConventionalParser::with_config(ParserConfig::default().exclude_type("chore"));

        let parsed = parser.parse(&make_commit("feat: feature")).unwrap();
        assert!(parser.should_include(&parsed));

        let parsed = parser.parse(&make_commit("chore: cleanup")).unwrap();
        assert!(!parser.should_include(&parsed));
    }

    #[test]
    fn test_should_include_with_includes() {
        let parser = ConventionalParser::with_config(ParserConfig::default().include_type("fix"));

        let parsed = parser.parse(&make_commit("fix: crash")).unwrap();
        assert!(parser.should_include(&parsed));

        let parsed = parser.parse(&make_commit("feat: feature")).unwrap();
        assert!(!parser.should_include(&parsed));
    }
}
