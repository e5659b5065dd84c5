//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::defaults::SUPPORTED_PRESETS;
use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    validate_git(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    if config.changelog.file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.file".to_string(),
            message: "changelog file cannot be empty".to_string(),
        }
        .into());
    }

    if config.changelog.notes_file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.notes_file".to_string(),
            message: "release notes file cannot be empty".to_string(),
        }
        .into());
    }

    if !SUPPORTED_PRESETS.contains(&config.changelog.preset.as_str()) {
        return Err(ConfigError::InvalidValue {
            field: "changelog.preset".to_string(),
            message: format!("must be one of: {}", SUPPORTED_PRESETS.join(", ")),
        }
        .into());
    }

    if config.changelog.header.is_some() && config.changelog.header_file.is_some() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.header".to_string(),
            message: "set either header or header_file, not both".to_string(),
        }
        .into());
    }

    for (commit_type, type_config) in &config.changelog.types {
        if type_config.section.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("changelog.types.{}.section", commit_type),
                message: "section title cannot be empty".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_git(config: &Config) -> Result<()> {
    if config.git.tag_prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidValue {
            field: "git.tag_prefix".to_string(),
            message: "tag prefix cannot contain whitespace".to_string(),
        }
        .into());
    }

    Ok(())
}
