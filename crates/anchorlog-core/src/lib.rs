//! anchorlog core - shared types for changelog management
//!
//! This crate provides error handling, configuration loading and release
//! version resolution for the anchorlog workspace.

pub mod config;
pub mod error;
pub mod version;

pub use error::{AnchorlogError, ChangelogError, ConfigError, GitError, RenderError, Result};
pub use version::{resolve_release_version, ResolvedVersion, VersionInputs, VersionSource};
