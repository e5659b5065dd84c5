//! Exit codes for the CLI

use anchorlog_core::{AnchorlogError, ChangelogError, ConfigError, GitError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error, including a missing release version
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// The rendering engine failed while streaming
pub const STREAM_ERROR: i32 = 6;

/// Rendered output disagreed with the reported version tags
pub const INVARIANT_ERROR: i32 = 7;

/// Pick the exit code for the first recognised error in the chain
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AnchorlogError>() {
            return match e {
                AnchorlogError::Config(_) => CONFIG_ERROR,
                AnchorlogError::Git(_) => GIT_ERROR,
                AnchorlogError::Changelog(e) => for_changelog(e),
            };
        }
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<GitError>() {
            return GIT_ERROR;
        }
        if let Some(e) = cause.downcast_ref::<ChangelogError>() {
            return for_changelog(e);
        }
    }
    ERROR
}

fn for_changelog(err: &ChangelogError) -> i32 {
    match err {
        ChangelogError::Stream(_) => STREAM_ERROR,
        ChangelogError::TagSequenceExhausted { .. } => INVARIANT_ERROR,
        _ => ERROR,
    }
}
