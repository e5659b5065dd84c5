//! Generate command

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use anchorlog_changelog::{
    merge, read_document, read_optional_text, write_document, ChangelogGenerator, DocumentLock,
    GitReleaseRenderer, MergeRequest, MergeResult, ReleaseRenderer, TailDisposition,
};
use anchorlog_core::config::{resolve_config, validate_config, ChangelogConfig, Config, DEFAULT_HEADER};
use anchorlog_core::{
    resolve_release_version, AnchorlogError, ConfigError, ResolvedVersion, VersionInputs,
    VersionSource,
};
use anchorlog_git::GitRepo;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Render the release and merge it into the changelog
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Version being released
    #[arg(short = 'r', long, value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Discard the existing changelog content and start over
    #[arg(short, long)]
    pub force: bool,

    /// Changelog file
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Header placed above the changelog
    #[arg(long, conflicts_with = "header_file")]
    pub header: Option<String>,

    /// File holding the header
    #[arg(long, value_name = "PATH")]
    pub header_file: Option<PathBuf>,

    /// Trailing content for a changelog created from scratch
    #[arg(long)]
    pub footer: Option<String>,

    /// Also write the newest release's notes to a file
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub notes: Option<Option<PathBuf>>,

    /// Commit message preset (angular, conventional)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Package manifest to read the version from
    #[arg(short = 'k', long, value_name = "PATH")]
    pub pkg: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'n', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON context file with a `version` key
    #[arg(short, long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    /// Prefix of version tags
    #[arg(short, long)]
    pub tag_prefix: Option<String>,

    /// Generate the log of one lerna package (tags named `<name>@<version>`)
    #[arg(short = 'l', long, value_name = "NAME", conflicts_with = "tag_prefix")]
    pub lerna_package: Option<String>,

    /// Only consider commits touching this path
    #[arg(long, value_name = "PATH")]
    pub commit_path: Option<PathBuf>,

    /// Number of releases to render (0 renders every release)
    #[arg(long)]
    pub release_count: Option<usize>,

    /// Print the merged changelog instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Summary printed with `--format json`
#[derive(Debug, Serialize)]
struct GenerateSummary {
    version: String,
    version_source: String,
    file: PathBuf,
    rendered: Vec<String>,
    tail: &'static str,
    retained: Vec<String>,
    notes_file: Option<PathBuf>,
    dry_run: bool,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        self.run(cli, &cwd)
    }

    /// Generate against the project rooted at `cwd`
    pub fn run(&self, cli: &Cli, cwd: &Path) -> anyhow::Result<()> {
        info!(
            release_version = ?self.release_version,
            force = self.force,
            dry_run = self.dry_run,
            cwd = %cwd.display(),
            "executing generate command"
        );

        let (mut config, config_path) = resolve_config(self.config.as_deref(), cwd)?;
        debug!(config = ?config_path, "configuration resolved");
        self.apply_overrides(&mut config);
        validate_config(&config)?;

        let resolved = self.resolve_version(cli, cwd)?;
        let version = resolved.version.clone();

        let log_path = cwd.join(&config.changelog.file);
        let _lock = if self.dry_run {
            None
        } else {
            Some(DocumentLock::acquire(&log_path)?)
        };

        let old_document = read_document(&log_path)?;
        let header = self.resolve_header(&config.changelog, cwd)?;
        let footer = self.footer.clone().or_else(|| config.changelog.footer.clone());

        let repo = GitRepo::discover(cwd)?;
        let commit_path = config.git.commit_path.as_ref().map(|p| cwd.join(p));
        let renderer = GitReleaseRenderer::new(
            repo,
            ChangelogGenerator::new(config.changelog.clone()),
            &config.git.tag_prefix,
        )?
        .releasing(&version)
        .with_commit_path(commit_path)
        .with_release_count(config.changelog.release_count);

        let mut request = MergeRequest::new(version.as_str(), header)
            .with_old_document(old_document)
            .with_force(self.force);
        if let Some(footer) = footer {
            request = request.with_footer(footer);
        }

        let result = merge(&request, renderer.prior_versions(), renderer.render(&version))?;

        let notes_path = self.notes.as_ref().map(|path| {
            cwd.join(path.clone().unwrap_or_else(|| config.changelog.notes_file.clone()))
        });

        if self.dry_run {
            if cli.format == OutputFormat::Text && !cli.quiet {
                print!("{}", result.document);
            }
        } else {
            write_document(&log_path, &result.document)?;
            if let Some(notes_path) = &notes_path {
                let notes = result.release_notes.as_deref().unwrap_or_default();
                write_document(notes_path, notes)?;
            }
        }

        self.report(cli, &resolved, &log_path, notes_path, &result)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(log) = &self.log {
            config.changelog.file = log.clone();
        }
        if let Some(preset) = &self.preset {
            config.changelog.preset = preset.clone();
        }
        if let Some(count) = self.release_count {
            config.changelog.release_count = count;
        }
        if let Some(prefix) = &self.tag_prefix {
            config.git.tag_prefix = prefix.clone();
        }
        if let Some(path) = &self.commit_path {
            config.git.commit_path = Some(path.clone());
        }
        if let Some(package) = &self.lerna_package {
            config.git.tag_prefix = format!("{}@", package);
            if config.git.commit_path.is_none() {
                let dir = package.rsplit('/').next().unwrap_or(package.as_str());
                config.git.commit_path = Some(Path::new("packages").join(dir));
            }
        }
    }

    fn resolve_version(&self, cli: &Cli, cwd: &Path) -> anyhow::Result<ResolvedVersion> {
        let inputs = VersionInputs {
            explicit: self.release_version.as_deref(),
            context_file: self.context.as_deref(),
            manifest: self.pkg.as_deref(),
        };

        match resolve_release_version(&inputs, cwd) {
            Ok(resolved) => Ok(resolved),
            Err(err @ AnchorlogError::Config(ConfigError::MissingVersion)) => {
                if !cli.quiet {
                    output::warning("No release version found. Provide it with one of:");
                    println!("{}", output::key_value("--release-version", "the version itself"));
                    println!("{}", output::key_value("--context", "a JSON file with a \"version\" key"));
                    println!("{}", output::key_value("--pkg", "a package.json or Cargo.toml with a version"));
                }
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Header precedence: flag, flag file, configured text, configured file, default
    fn resolve_header(&self, config: &ChangelogConfig, cwd: &Path) -> anyhow::Result<String> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }

        let header_file = self.header_file.as_ref().or(config.header_file.as_ref());
        if self.header_file.is_none() {
            if let Some(header) = &config.header {
                return Ok(header.clone());
            }
        }

        if let Some(path) = header_file {
            let path = cwd.join(path);
            return match read_optional_text(&path)? {
                Some(text) => Ok(text),
                None => Err(ConfigError::NotFound(path).into()),
            };
        }

        Ok(DEFAULT_HEADER.to_string())
    }

    fn report(
        &self,
        cli: &Cli,
        resolved: &ResolvedVersion,
        log_path: &Path,
        notes_path: Option<PathBuf>,
        result: &MergeResult,
    ) -> anyhow::Result<()> {
        let rendered: Vec<String> = result.versions().iter().map(|v| v.to_string()).collect();

        match cli.format {
            OutputFormat::Json => {
                let summary = GenerateSummary {
                    version: resolved.version.clone(),
                    version_source: source_label(&resolved.source),
                    file: log_path.to_path_buf(),
                    rendered,
                    tail: tail_label(&result.tail),
                    retained: result.retained.clone(),
                    notes_file: notes_path,
                    dry_run: self.dry_run,
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text if cli.quiet || self.dry_run => {}
            OutputFormat::Text => {
                output::success(&format!(
                    "Changelog for {} written to {}",
                    output::version_style().apply_to(&resolved.version),
                    output::path_style().apply_to(log_path.display())
                ));
                if cli.verbose {
                    println!("{}", output::key_value("version source", &source_label(&resolved.source)));
                    println!("{}", output::key_value("rendered", &rendered.join(", ")));
                    println!("{}", output::key_value("previous content", tail_label(&result.tail)));
                    println!("{}", output::key_value("kept releases", &result.retained.join(", ")));
                }
                if let Some(notes_path) = notes_path {
                    output::info(&format!(
                        "Release notes written to {}",
                        output::path_style().apply_to(notes_path.display())
                    ));
                }
            }
        }

        Ok(())
    }
}

fn source_label(source: &VersionSource) -> String {
    match source {
        VersionSource::Explicit => "flag".to_string(),
        VersionSource::Context(path) => format!("context {}", path.display()),
        VersionSource::Manifest(path) => format!("manifest {}", path.display()),
    }
}

fn tail_label(tail: &TailDisposition) -> &'static str {
    match tail {
        TailDisposition::Footer => "new",
        TailDisposition::Reset => "reset",
        TailDisposition::Retained => "retained",
        TailDisposition::Legacy => "legacy",
        TailDisposition::PrunedAt(_) => "pruned",
        TailDisposition::Discarded => "discarded",
    }
}
