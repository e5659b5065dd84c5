//! Parser configuration types

use std::collections::HashSet;
use std::str::FromStr;

/// Commit message convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// `type(scope): subject`; breaking changes only via a `BREAKING CHANGE` footer
    #[default]
    Angular,
    /// Conventional Commits 1.0, which also accepts the `type!:` marker
    Conventional,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "angular" => Ok(Self::Angular),
            "conventional" | "conventionalcommits" => Ok(Self::Conventional),
            other => Err(format!("unknown preset: {}", other)),
        }
    }
}

/// Configuration for the commit parser
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Message convention
    pub preset: Preset,
    /// Commit types to include
    pub include_types: HashSet<String>,
    /// Commit types to exclude
    pub exclude_types: HashSet<String>,
    /// Whether to include merge commits
    pub include_merges: bool,
}

impl ParserConfig {
    /// Create a config for a preset
    pub fn for_preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Default::default()
        }
    }

    /// Add a type to include
    pub fn include_type(mut self, type_name: impl Into<String>) -> Self {
        self.include_types.insert(type_name.into());
        self
    }

    /// Add a type to exclude
    pub fn exclude_type(mut self, type_name: impl Into<String>) -> Self {
        self.exclude_types.insert(type_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!("angular".parse::<Preset>().unwrap(), Preset::Angular);
        assert_eq!("Conventional".parse::<Preset>().unwrap(), Preset::Conventional);
        assert!("eslint".parse::<Preset>().is_err());
    }
}
