//! Release version resolution
//!
//! The version being released comes from, in order of precedence:
//!
//! 1. an explicit value (the `--release-version` flag),
//! 2. the `version` key of a JSON context file,
//! 3. the `version` of a package manifest (`package.json` or `Cargo.toml`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::{ConfigError, Result};

/// Manifest file names searched for, in order, at each directory level
pub const MANIFEST_FILE_NAMES: &[&str] = &["package.json", "Cargo.toml"];

/// Where a resolved release version came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Passed explicitly by the caller
    Explicit,
    /// Read from a context file
    Context(PathBuf),
    /// Read from a package manifest
    Manifest(PathBuf),
}

/// A release version together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The version identifier
    pub version: String,
    /// Where it was found
    pub source: VersionSource,
}

/// Inputs for [`resolve_release_version`]
#[derive(Debug, Clone, Default)]
pub struct VersionInputs<'a> {
    /// Explicit version, wins over everything else
    pub explicit: Option<&'a str>,
    /// JSON context file with a `version` key
    pub context_file: Option<&'a Path>,
    /// Package manifest; when unset the nearest one is searched for
    pub manifest: Option<&'a Path>,
}

/// Resolve the release version.
///
/// Fails with [`ConfigError::MissingVersion`] when no source provides one.
/// A context file or manifest that was named explicitly but cannot be read
/// is an error; a manifest found by searching that lacks a version is not.
#[instrument(skip(inputs), fields(cwd = %cwd.display()))]
pub fn resolve_release_version(inputs: &VersionInputs<'_>, cwd: &Path) -> Result<ResolvedVersion> {
    if let Some(version) = inputs.explicit.map(str::trim).filter(|v| !v.is_empty()) {
        debug!(version, "using explicit release version");
        return Ok(ResolvedVersion {
            version: version.to_string(),
            source: VersionSource::Explicit,
        });
    }

    if let Some(context_file) = inputs.context_file {
        let path = absolutize(context_file, cwd);
        if let Some(version) = read_context_version(&path)? {
            info!(version, path = %path.display(), "release version from context file");
            return Ok(ResolvedVersion {
                version,
                source: VersionSource::Context(path),
            });
        }
    }

    let manifest = match inputs.manifest {
        Some(path) => Some((absolutize(path, cwd), true)),
        None => find_manifest(cwd).map(|p| (p, false)),
    };

    if let Some((path, explicit)) = manifest {
        match read_manifest_version(&path) {
            Ok(version) => {
                info!(version, path = %path.display(), "release version from package manifest");
                return Ok(ResolvedVersion {
                    version,
                    source: VersionSource::Manifest(path),
                });
            }
            Err(e) if explicit => return Err(e),
            Err(e) => debug!(error = %e, "ignoring discovered manifest"),
        }
    }

    Err(ConfigError::MissingVersion.into())
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[derive(Debug, Deserialize)]
struct Context {
    version: Option<String>,
}

/// Read the `version` key from a JSON context file
pub fn read_context_version(path: &Path) -> Result<Option<String>> {
    debug!(path = %path.display(), "reading context file");
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let context: Context = serde_json::from_str(&content).map_err(ConfigError::JsonError)?;
    Ok(context.version.filter(|v| !v.trim().is_empty()))
}

/// Find the nearest package manifest, walking up from `start_dir`
pub fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        for name in MANIFEST_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "found package manifest");
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    version: Option<toml::Value>,
}

/// Read the version declared by a `package.json` or `Cargo.toml`
pub fn read_manifest_version(path: &Path) -> Result<String> {
    let manifest_error = |reason: &str| ConfigError::Manifest {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let version = if path.extension().is_some_and(|e| e == "toml") {
        let manifest: CargoToml = toml::from_str(&content).map_err(ConfigError::TomlError)?;
        match manifest.package.and_then(|p| p.version) {
            Some(toml::Value::String(v)) => Some(v),
            Some(_) => return Err(manifest_error("version is inherited from the workspace").into()),
            None => None,
        }
    } else {
        let manifest: PackageJson =
            serde_json::from_str(&content).map_err(ConfigError::JsonError)?;
        manifest.version
    };

    version
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| manifest_error("no version field").into())
}
