//! anchorlog git - repository access for changelog rendering
//!
//! This crate reads commit history and version tags.

mod commits;
mod repository;
mod tags;
pub mod types;

pub use repository::{GitRepo, Result};
pub use types::{version_from_tag, CommitInfo, TagInfo};
