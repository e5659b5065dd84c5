//! Error types for anchorlog

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AnchorlogError
pub type Result<T> = std::result::Result<T, AnchorlogError>;

/// Main error type for anchorlog operations
#[derive(Debug, Error)]
pub enum AnchorlogError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// No release version could be resolved from flags, context or manifest
    #[error("Missing required argument: release version")]
    MissingVersion,

    /// Package manifest could not be read or has no version
    #[error("Failed to read package manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Failure reported by a rendering engine while it streams chunks
#[derive(Debug, Error)]
pub enum RenderError {
    /// Repository access failed while rendering a release
    #[error("failed to render release {version}")]
    Git {
        version: String,
        #[source]
        source: GitError,
    },

    /// Renderer-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// The rendering engine failed mid-stream
    #[error("Rendering stream failed: {0}")]
    Stream(#[from] RenderError),

    /// More rendered chunks arrived than prior versions were reported
    #[error(
        "Rendered chunk {chunk} has no matching prior version ({available} reported); \
         the renderer's tag list is out of sync with its output"
    )]
    TagSequenceExhausted { chunk: usize, available: usize },

    /// Failed to read an existing document
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a document
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another run holds the document lock
    #[error("Failed to lock {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
