//! Merging freshly rendered releases into an existing changelog
//!
//! A merge run takes the previous document text and a stream of rendered
//! release chunks (newest first) and produces:
//!
//! ```text
//! header
//! <a name="log"></a>
//! <a name="{target}"></a>      chunk 0
//! ...
//! <a name="{prior[0]}"></a>    chunk 1
//! ...
//! retained old tail
//! ```
//!
//! The old tail is computed once, before any chunk is consumed, and pruned
//! after the stream ends when the run regenerates a version the previous
//! document already contains. Nothing here touches the filesystem.

use anchorlog_core::error::{ChangelogError, RenderError};
use tracing::{debug, info, instrument};

use crate::anchor::{
    anchors, document_start_anchor, find_document_start, find_version_start, Anchor,
};
use crate::types::VersionSection;

/// Input of a merge run
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    /// Previous document text, empty when there is none
    pub old_document: String,
    /// Discard everything the previous document holds
    pub force_regenerate: bool,
    /// Header placed above the document-start anchor
    pub header: String,
    /// Trailing content, used only when there is no previous document
    pub footer: Option<String>,
    /// Version being released; labels the first chunk
    pub target_version: String,
}

impl MergeRequest {
    /// Create a request for `target_version` with no previous document
    pub fn new(target_version: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            target_version: target_version.into(),
            header: header.into(),
            ..Default::default()
        }
    }

    /// Set the previous document text
    pub fn with_old_document(mut self, old_document: impl Into<String>) -> Self {
        self.old_document = old_document.into();
        self
    }

    /// Set the force-regenerate policy
    pub fn with_force(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }

    /// Set the footer
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// Which rule decided the retained old tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailDisposition {
    /// No previous document; the footer (if any) was appended
    Footer,
    /// Forced regeneration; nothing was kept
    Reset,
    /// Everything after the document-start anchor was kept
    Retained,
    /// The previous document has no document-start anchor; all of it was kept
    Legacy,
    /// A regenerated version was found; the tail restarts at this version
    PrunedAt(String),
    /// A regenerated version was found and every older version was re-rendered
    Discarded,
}

/// Output of a merge run
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged document
    pub document: String,
    /// Sections rendered in this run, newest first
    pub sections: Vec<VersionSection>,
    /// Raw rendered text of the newest release
    pub release_notes: Option<String>,
    /// How the previous document's content was treated
    pub tail: TailDisposition,
    /// Versions anchored in the kept old tail, in document order
    pub retained: Vec<String>,
}

impl MergeResult {
    /// Versions rendered in this run, newest first
    pub fn versions(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.version.as_str()).collect()
    }
}

/// Incremental merge state for one run.
///
/// Feed chunks with [`push`](Self::push) in the order the renderer emits
/// them, then call [`finish`](Self::finish). Dropping the merger without
/// finishing discards the partial log.
pub struct ChangelogMerger<'a> {
    request: &'a MergeRequest,
    prior_versions: &'a [String],
    tail: String,
    disposition: TailDisposition,
    log: String,
    sections: Vec<VersionSection>,
    release_notes: Option<String>,
}

impl<'a> ChangelogMerger<'a> {
    /// Start a run, computing the old tail from the request.
    ///
    /// `prior_versions` is the renderer's list of earlier versions, newest
    /// first; entry `i` labels chunk `i + 1`.
    pub fn new(request: &'a MergeRequest, prior_versions: &'a [String]) -> Self {
        let (tail, disposition) = initial_tail(request);
        debug!(
            tail_len = tail.len(),
            disposition = ?disposition,
            "computed old tail"
        );

        Self {
            request,
            prior_versions,
            tail,
            disposition,
            log: String::new(),
            sections: Vec::new(),
            release_notes: None,
        }
    }

    /// Label the next chunk, anchor it and append it to the log
    pub fn push(&mut self, text: String) -> Result<&VersionSection, ChangelogError> {
        let index = self.sections.len();
        let version = if index == 0 {
            self.request.target_version.clone()
        } else {
            self.prior_versions
                .get(index - 1)
                .cloned()
                .ok_or(ChangelogError::TagSequenceExhausted {
                    chunk: index,
                    available: self.prior_versions.len(),
                })?
        };

        let section = VersionSection::new(version, &text);
        debug!(version = %section.version, index, "appending section");
        self.log.push_str(&section.to_markdown());

        if index == 0 {
            self.release_notes = Some(text);
        }
        self.sections.push(section);
        Ok(&self.sections[index])
    }

    /// Prune the old tail against the rendered sections and assemble the document
    pub fn finish(mut self) -> MergeResult {
        self.prune_tail();

        let mut document = String::with_capacity(
            self.request.header.len() + self.log.len() + self.tail.len() + 32,
        );
        document.push_str(&self.request.header);
        document.push('\n');
        document.push_str(&document_start_anchor());
        document.push_str(&self.log);
        document.push_str(&self.tail);

        let retained: Vec<String> = anchors(&self.tail)
            .into_iter()
            .filter_map(|anchor| match anchor {
                Anchor::VersionStart(version) => Some(version),
                Anchor::DocumentStart => None,
            })
            .collect();

        info!(
            sections = self.sections.len(),
            retained = retained.len(),
            tail = ?self.disposition,
            len = document.len(),
            "changelog merged"
        );

        MergeResult {
            document,
            sections: self.sections,
            release_notes: self.release_notes,
            tail: self.disposition,
            retained,
        }
    }

    /// Drop the part of the old tail superseded by this run.
    ///
    /// Only fires when the tail already holds the target version. The tail
    /// then restarts at the first prior version this run did not re-render:
    /// with `n` chunks that is `prior_versions[n - 1]`.
    fn prune_tail(&mut self) {
        let rendered = self.sections.len();
        if rendered == 0 || self.tail.is_empty() {
            return;
        }
        if find_version_start(&self.tail, &self.request.target_version).is_none() {
            return;
        }

        match self.prior_versions.get(rendered - 1) {
            None => {
                debug!(
                    version = %self.request.target_version,
                    "regenerated version with no older release left; discarding old tail"
                );
                self.tail.clear();
                self.disposition = TailDisposition::Discarded;
            }
            Some(keep_from) => match find_version_start(&self.tail, keep_from) {
                Some(range) => {
                    debug!(
                        version = %self.request.target_version,
                        keep_from = %keep_from,
                        dropped = range.start,
                        "pruning regenerated sections from old tail"
                    );
                    self.tail.drain(..range.start);
                    self.disposition = TailDisposition::PrunedAt(keep_from.clone());
                }
                None => {
                    debug!(keep_from = %keep_from, "no anchor to prune at; keeping old tail");
                }
            },
        }
    }
}

fn initial_tail(request: &MergeRequest) -> (String, TailDisposition) {
    if request.old_document.is_empty() {
        let footer = request.footer.clone().unwrap_or_default();
        return (footer, TailDisposition::Footer);
    }

    if request.force_regenerate {
        return (String::new(), TailDisposition::Reset);
    }

    match find_document_start(&request.old_document) {
        Some(range) => (
            request.old_document[range.end..].to_string(),
            TailDisposition::Retained,
        ),
        None => (request.old_document.clone(), TailDisposition::Legacy),
    }
}

/// Run a full merge over a finite chunk stream.
///
/// The first stream error aborts the run and is returned as
/// [`ChangelogError::Stream`]; no partial result is produced.
#[instrument(skip_all, fields(version = %request.target_version, force = request.force_regenerate))]
pub fn merge<I>(
    request: &MergeRequest,
    prior_versions: &[String],
    chunks: I,
) -> Result<MergeResult, ChangelogError>
where
    I: IntoIterator<Item = Result<String, RenderError>>,
{
    let mut merger = ChangelogMerger::new(request, prior_versions);
    for chunk in chunks {
        merger.push(chunk?)?;
    }
    Ok(merger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<header>";

    fn ok_chunks(texts: &[&str]) -> Vec<Result<String, RenderError>> {
        texts.iter().map(|t| Ok(t.to_string())).collect()
    }

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_concrete_scenario() {
        let request = MergeRequest::new("2.1.0", HEADER)
            .with_old_document("<a name=\"log\"></a>\n<a name=\"2.0.0\"></a>\nfoo\n");
        let result = merge(&request, &versions(&["2.0.0"]), ok_chunks(&["bar\n"])).unwrap();

        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"2.1.0\"></a>\nbar\n\n<a name=\"2.0.0\"></a>\nfoo\n"
        );
        assert_eq!(result.tail, TailDisposition::Retained);
        assert_eq!(result.release_notes.as_deref(), Some("bar\n"));
        assert_eq!(result.retained, versions(&["2.0.0"]));
    }

    #[test]
    fn test_regenerating_same_version_is_idempotent() {
        let prior = versions(&["2.0.0"]);
        let first = merge(
            &MergeRequest::new("2.1.0", HEADER)
                .with_old_document("<a name=\"log\"></a>\n<a name=\"2.0.0\"></a>\nfoo\n"),
            &prior,
            ok_chunks(&["bar\n"]),
        )
        .unwrap();

        let second = merge(
            &MergeRequest::new("2.1.0", HEADER).with_old_document(first.document.clone()),
            &prior,
            ok_chunks(&["bar\n"]),
        )
        .unwrap();

        assert_eq!(second.document, first.document);
        assert_eq!(second.tail, TailDisposition::PrunedAt("2.0.0".to_string()));
    }

    #[test]
    fn test_regenerated_section_is_replaced() {
        let old = "# Old header\n<a name=\"log\"></a>\n<a name=\"1.1.0\"></a>\nstale\n\n<a name=\"1.0.0\"></a>\nfirst\n";
        let request = MergeRequest::new("1.1.0", HEADER).with_old_document(old);
        let result = merge(&request, &versions(&["1.0.0"]), ok_chunks(&["fresh\n"])).unwrap();

        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"1.1.0\"></a>\nfresh\n\n<a name=\"1.0.0\"></a>\nfirst\n"
        );
    }

    #[test]
    fn test_no_loss_of_unrendered_history() {
        let old = "<a name=\"log\"></a>\n\
                   <a name=\"1.0.0\"></a>\nv1\n\n\
                   <a name=\"0.2.0\"></a>\nv2\n\n\
                   <a name=\"0.1.0\"></a>\nv3 legacy\n";
        let request = MergeRequest::new("2.0.0", HEADER).with_old_document(old);
        let result = merge(
            &request,
            &versions(&["1.0.0", "0.2.0"]),
            ok_chunks(&["v0\n"]),
        )
        .unwrap();

        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n\
             <a name=\"2.0.0\"></a>\nv0\n\n\
             <a name=\"1.0.0\"></a>\nv1\n\n\
             <a name=\"0.2.0\"></a>\nv2\n\n\
             <a name=\"0.1.0\"></a>\nv3 legacy\n"
        );
    }

    #[test]
    fn test_multiple_chunks_use_prior_versions_in_order() {
        let request = MergeRequest::new("3.0.0", HEADER);
        let result = merge(
            &request,
            &versions(&["2.0.0", "1.0.0"]),
            ok_chunks(&["three\n", "two\n", "one\n"]),
        )
        .unwrap();

        assert_eq!(result.versions(), vec!["3.0.0", "2.0.0", "1.0.0"]);
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n\
             <a name=\"3.0.0\"></a>\nthree\n\n\
             <a name=\"2.0.0\"></a>\ntwo\n\n\
             <a name=\"1.0.0\"></a>\none\n\n"
        );
    }

    #[test]
    fn test_regenerating_several_releases_keeps_older_ones() {
        let old = "<a name=\"log\"></a>\n\
                   <a name=\"3.0.0\"></a>\nold three\n\n\
                   <a name=\"2.0.0\"></a>\nold two\n\n\
                   <a name=\"1.0.0\"></a>\nold one\n";
        let request = MergeRequest::new("3.0.0", HEADER).with_old_document(old);
        let result = merge(
            &request,
            &versions(&["2.0.0", "1.0.0"]),
            ok_chunks(&["three\n", "two\n"]),
        )
        .unwrap();

        assert_eq!(result.tail, TailDisposition::PrunedAt("1.0.0".to_string()));
        assert_eq!(result.retained, versions(&["1.0.0"]));
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n\
             <a name=\"3.0.0\"></a>\nthree\n\n\
             <a name=\"2.0.0\"></a>\ntwo\n\n\
             <a name=\"1.0.0\"></a>\nold one\n"
        );
    }

    #[test]
    fn test_regenerating_without_prior_versions_discards_tail() {
        let old = "<a name=\"log\"></a>\n<a name=\"0.1.0\"></a>\nfirst draft\n";
        let request = MergeRequest::new("0.1.0", HEADER).with_old_document(old);
        let result = merge(&request, &[], ok_chunks(&["final\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Discarded);
        assert!(result.retained.is_empty());
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"0.1.0\"></a>\nfinal\n\n"
        );
    }

    #[test]
    fn test_regenerated_version_without_prior_anchor_keeps_tail() {
        let old = "<a name=\"log\"></a>\n<a name=\"1.1.0\"></a>\nstale\n";
        let request = MergeRequest::new("1.1.0", HEADER).with_old_document(old);
        let result = merge(&request, &versions(&["1.0.0"]), ok_chunks(&["fresh\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Retained);
        assert!(result.document.ends_with("<a name=\"1.1.0\"></a>\nstale\n"));
    }

    #[test]
    fn test_force_discards_previous_sections() {
        let old = "# Old\n<a name=\"log\"></a>\n<a name=\"1.0.0\"></a>\nold\n";
        let request = MergeRequest::new("1.1.0", HEADER)
            .with_old_document(old)
            .with_force(true)
            .with_footer("ignored footer\n");
        let result = merge(&request, &versions(&["1.0.0"]), ok_chunks(&["new\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Reset);
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"1.1.0\"></a>\nnew\n\n"
        );
    }

    #[test]
    fn test_empty_old_document_appends_footer() {
        let request = MergeRequest::new("1.0.0", HEADER).with_footer("_generated_\n");
        let result = merge(&request, &[], ok_chunks(&["first\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Footer);
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"1.0.0\"></a>\nfirst\n\n_generated_\n"
        );
    }

    #[test]
    fn test_empty_old_document_behaves_as_forced() {
        let unforced = merge(
            &MergeRequest::new("1.0.0", HEADER),
            &[],
            ok_chunks(&["first\n"]),
        )
        .unwrap();
        let forced = merge(
            &MergeRequest::new("1.0.0", HEADER).with_force(true),
            &[],
            ok_chunks(&["first\n"]),
        )
        .unwrap();

        assert_eq!(unforced.document, forced.document);
    }

    #[test]
    fn test_whitespace_only_document_is_not_empty() {
        let request = MergeRequest::new("1.0.0", HEADER)
            .with_old_document("\n\n")
            .with_footer("_generated_\n");
        let result = merge(&request, &[], ok_chunks(&["first\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Legacy);
        assert!(!result.document.contains("_generated_"));
        assert!(result.document.ends_with("first\n\n\n\n"));
    }

    #[test]
    fn test_legacy_document_without_anchor_is_kept_whole() {
        let old = "# Changelog\n\n## 0.9.0\n- something\n";
        let request = MergeRequest::new("1.0.0", HEADER).with_old_document(old);
        let result = merge(&request, &versions(&["0.9.0"]), ok_chunks(&["new\n"])).unwrap();

        assert_eq!(result.tail, TailDisposition::Legacy);
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"1.0.0\"></a>\nnew\n\n# Changelog\n\n## 0.9.0\n- something\n"
        );
    }

    #[test]
    fn test_trailing_blank_lines_collapse() {
        for text in ["text\n", "text\n\n", "text\n\n\n", "text\n\n\n\n\n\n"] {
            let result = merge(
                &MergeRequest::new("2.0.0", HEADER),
                &versions(&["1.0.0"]),
                ok_chunks(&[text, "older\n"]),
            )
            .unwrap();

            assert!(
                result
                    .document
                    .contains("text\n\n<a name=\"1.0.0\"></a>\nolder\n\n"),
                "chunk {:?} produced {:?}",
                text,
                result.document
            );
        }
    }

    #[test]
    fn test_empty_chunk_sequence_is_noop_release() {
        let old = "# H\n<a name=\"log\"></a>\n<a name=\"1.0.0\"></a>\nold\n";
        let request = MergeRequest::new("1.0.0", HEADER).with_old_document(old);
        let result = merge(&request, &versions(&["0.9.0"]), ok_chunks(&[])).unwrap();

        assert!(result.sections.is_empty());
        assert!(result.release_notes.is_none());
        assert_eq!(
            result.document,
            "<header>\n<a name=\"log\"></a>\n<a name=\"1.0.0\"></a>\nold\n"
        );
    }

    #[test]
    fn test_tag_sequence_shorter_than_chunks_is_fatal() {
        let request = MergeRequest::new("2.0.0", HEADER);
        let err = merge(
            &request,
            &versions(&["1.0.0"]),
            ok_chunks(&["a\n", "b\n", "c\n"]),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ChangelogError::TagSequenceExhausted {
                chunk: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_stream_error_aborts_merge() {
        let request = MergeRequest::new("2.0.0", HEADER);
        let chunks = vec![
            Ok("a\n".to_string()),
            Err(RenderError::Failed("template exploded".to_string())),
            Ok("c\n".to_string()),
        ];
        let err = merge(&request, &versions(&["1.0.0", "0.1.0"]), chunks).unwrap_err();

        assert!(matches!(err, ChangelogError::Stream(_)));
        assert!(err.to_string().contains("template exploded"));
    }

    #[test]
    fn test_release_notes_are_raw_first_chunk() {
        let request = MergeRequest::new("2.0.0", HEADER);
        let result = merge(
            &request,
            &versions(&["1.0.0"]),
            ok_chunks(&["## 2.0.0\n\n- new\n\n\n", "## 1.0.0\n"]),
        )
        .unwrap();

        assert_eq!(result.release_notes.as_deref(), Some("## 2.0.0\n\n- new\n\n\n"));
        assert!(result.document.contains("<a name=\"2.0.0\"></a>\n## 2.0.0\n\n- new\n\n<a name=\"1.0.0\"></a>"));
    }

    #[test]
    fn test_incremental_push() {
        let prior = versions(&["1.0.0"]);
        let request = MergeRequest::new("1.1.0", HEADER);
        let mut merger = ChangelogMerger::new(&request, &prior);

        assert_eq!(merger.push("new\n".to_string()).unwrap().version, "1.1.0");
        assert_eq!(merger.push("old\n".to_string()).unwrap().version, "1.0.0");
        assert!(merger.push("extra\n".to_string()).is_err());

        let result = merger.finish();
        assert_eq!(result.versions(), vec!["1.1.0", "1.0.0"]);
    }
}
