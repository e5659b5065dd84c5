//! anchorlog changelog - anchored changelog documents
//!
//! This crate tags rendered releases with HTML anchors, merges them into an
//! existing changelog and ships the default git-backed rendering engine.

pub mod anchor;
pub mod formatter;
pub mod generator;
pub mod merge;
pub mod parser;
pub mod render;
pub mod store;
pub mod types;

pub use anchor::{document_start_anchor, version_start_anchor, Anchor};
pub use generator::ChangelogGenerator;
pub use merge::{merge, ChangelogMerger, MergeRequest, MergeResult, TailDisposition};
pub use parser::{CommitParser, ConventionalParser, Preset};
pub use render::{ChunkStream, GitReleaseRenderer, ReleaseRenderer, StaticRenderer};
pub use store::{read_document, read_optional_text, write_document, DocumentLock};
pub use types::{ChangelogEntry, ParsedCommit, Section, VersionSection};
