//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "anchorlog.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "anchorlog.toml";

/// Default changelog file
pub const DEFAULT_LOG_FILE: &str = "CHANGELOG.md";

/// Default release notes sidecar file
pub const DEFAULT_NOTES_FILE: &str = "RELEASE-NOTES.md";

/// Default commit message preset
pub const DEFAULT_PRESET: &str = "angular";

/// Presets understood by the built-in renderer
pub const SUPPORTED_PRESETS: &[&str] = &["angular", "conventional"];

/// Header written above the document-start anchor when none is configured
pub const DEFAULT_HEADER: &str = "# Changelog

All notable changes to this project will be documented in this file.
";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ".anchorlog.yaml",
        ".anchorlog.toml",
    ]
}

/// Generate default configuration TOML
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# anchorlog configuration

changelog:
  file: CHANGELOG.md
  notes_file: RELEASE-NOTES.md
  preset: angular
  release_count: 1
  include_hashes: true
  include_authors: false
  types:
    feat:
      section: Features
    fix:
      section: Bug Fixes
    perf:
      section: Performance
    revert:
      section: Reverts
    docs:
      section: Documentation
      hidden: true
    chore:
      section: Chores
      hidden: true

git:
  tag_prefix: v
"#;
