//! Changelog anchors
//!
//! Anchors are HTML name tags on a line of their own:
//!
//! ```text
//! <a name="log"></a>      document start
//! <a name="1.2.0"></a>    start of the 1.2.0 section
//! ```
//!
//! They let a later run find the boundaries of the previous document by
//! plain text search, without parsing the markdown around them. Version
//! identifiers are embedded as-is; callers keep them free of `"` and line
//! breaks.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Name carried by the document-start anchor
pub const DOCUMENT_START_NAME: &str = "log";

static DOCUMENT_START_REGEX: LazyLock<Regex> = LazyLock::new(|| line_pattern(DOCUMENT_START_NAME));

static ANCHOR_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<a name="([^"\r\n]*)"></a>\r?$"#).expect("Invalid regex"));

/// A decoded anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Marks the start of the log, right after the header
    DocumentStart,
    /// Marks the start of one version's section
    VersionStart(String),
}

impl Anchor {
    /// Encode the anchor as a full line, including its trailing newline
    pub fn encode(&self) -> String {
        match self {
            Self::DocumentStart => anchor_line(DOCUMENT_START_NAME),
            Self::VersionStart(version) => anchor_line(version),
        }
    }
}

fn anchor_line(name: &str) -> String {
    format!("<a name=\"{}\"></a>\n", name)
}

/// Pattern matching exactly one anchor line, through its line break
fn line_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?m)^<a name="{}"></a>(?:\r?\n|\z)"#,
        regex::escape(name)
    ))
    .expect("escaped anchor pattern is always valid")
}

/// The document-start anchor line
pub fn document_start_anchor() -> String {
    Anchor::DocumentStart.encode()
}

/// The anchor line opening the section of `version`
pub fn version_start_anchor(version: &str) -> String {
    Anchor::VersionStart(version.to_string()).encode()
}

/// Line-anchored pattern for the document-start anchor
pub fn document_start_pattern() -> &'static Regex {
    &DOCUMENT_START_REGEX
}

/// Line-anchored exact-match pattern for the anchor of `version`.
///
/// Matches only a whole line, so `1.2.0` never matches the anchors of
/// `1.2.0-beta` or `11.2.0`.
pub fn version_start_pattern(version: &str) -> Regex {
    line_pattern(version)
}

/// Byte range of the document-start anchor line in `text`, line break included
pub fn find_document_start(text: &str) -> Option<Range<usize>> {
    document_start_pattern().find(text).map(|m| m.range())
}

/// Byte range of the anchor line for `version` in `text`, line break included
pub fn find_version_start(text: &str, version: &str) -> Option<Range<usize>> {
    version_start_pattern(version).find(text).map(|m| m.range())
}

/// Decode a single line into an anchor.
///
/// The exact inverse of [`Anchor::encode`]: a trailing line break is
/// accepted, anything else around the tag is not.
pub fn parse_anchor(line: &str) -> Option<Anchor> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let caps = ANCHOR_LINE_REGEX.captures(line)?;
    let name = caps.get(1)?.as_str();

    if name == DOCUMENT_START_NAME {
        Some(Anchor::DocumentStart)
    } else {
        Some(Anchor::VersionStart(name.to_string()))
    }
}

/// Every anchor in `text`, in document order
pub fn anchors(text: &str) -> Vec<Anchor> {
    text.lines().filter_map(parse_anchor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(document_start_anchor(), "<a name=\"log\"></a>\n");
        assert_eq!(version_start_anchor("1.2.0"), "<a name=\"1.2.0\"></a>\n");
    }

    #[test]
    fn test_parse_is_inverse_of_encode() {
        for version in ["1.0.0", "2.0.0-rc.1", "v3", "2024.01.15", "1.0.0+build.7"] {
            let anchor = Anchor::VersionStart(version.to_string());
            assert_eq!(parse_anchor(&anchor.encode()), Some(anchor));
        }
        assert_eq!(
            parse_anchor(&document_start_anchor()),
            Some(Anchor::DocumentStart)
        );
    }

    #[test]
    fn test_parse_rejects_surrounding_text() {
        assert_eq!(parse_anchor("see <a name=\"1.0.0\"></a>"), None);
        assert_eq!(parse_anchor("<a name=\"1.0.0\"></a> trailing"), None);
        assert_eq!(parse_anchor("## 1.0.0"), None);
    }

    #[test]
    fn test_version_pattern_is_exact() {
        let pattern = version_start_pattern("1.2.0");
        assert!(pattern.is_match(&version_start_anchor("1.2.0")));
        assert!(!pattern.is_match(&version_start_anchor("1.2.0-beta")));
        assert!(!pattern.is_match(&version_start_anchor("11.2.0")));
        assert!(!pattern.is_match(&version_start_anchor("1.2.00")));
    }

    #[test]
    fn test_version_pattern_escapes_metacharacters() {
        // `.` must not act as a wildcard
        let pattern = version_start_pattern("1.2.0");
        assert!(!pattern.is_match("<a name=\"1x2y0\"></a>\n"));

        let pattern = version_start_pattern("1.0.0+build.1");
        assert!(pattern.is_match("<a name=\"1.0.0+build.1\"></a>\n"));
    }

    #[test]
    fn test_version_pattern_requires_own_line() {
        let pattern = version_start_pattern("1.0.0");
        assert!(!pattern.is_match("text <a name=\"1.0.0\"></a>\n"));
        assert!(pattern.is_match("intro\n<a name=\"1.0.0\"></a>\nbody\n"));
        assert!(pattern.is_match("intro\r\n<a name=\"1.0.0\"></a>\r\nbody\r\n"));
        assert!(pattern.is_match("end\n<a name=\"1.0.0\"></a>"));
    }

    #[test]
    fn test_find_document_start_includes_line_break() {
        let text = "# Changelog\n<a name=\"log\"></a>\nrest";
        let range = find_document_start(text).unwrap();
        assert_eq!(&text[range.end..], "rest");
    }

    #[test]
    fn test_find_version_start() {
        let text = "<a name=\"log\"></a>\n<a name=\"2.0.0\"></a>\nfoo\n<a name=\"1.0.0\"></a>\nbar\n";
        let range = find_version_start(text, "1.0.0").unwrap();
        assert_eq!(&text[range.start..], "<a name=\"1.0.0\"></a>\nbar\n");
        assert!(find_version_start(text, "0.9.0").is_none());
    }

    #[test]
    fn test_anchors_in_order() {
        let text = "# Log\n<a name=\"log\"></a>\n<a name=\"2.0.0\"></a>\nx\n<a name=\"1.0.0\"></a>\n";
        assert_eq!(
            anchors(text),
            vec![
                Anchor::DocumentStart,
                Anchor::VersionStart("2.0.0".to_string()),
                Anchor::VersionStart("1.0.0".to_string()),
            ]
        );
    }
}
