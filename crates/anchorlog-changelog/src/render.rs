//! Rendering engines feeding the merger
//!
//! A renderer reports the versions released before the one being cut and
//! produces one text chunk per release, newest first. Chunk `0` belongs to
//! the target version, chunk `i` to `prior_versions()[i - 1]`.

use std::path::PathBuf;

use anchorlog_core::error::{GitError, RenderError};
use anchorlog_git::{CommitInfo, GitRepo, TagInfo};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::generator::ChangelogGenerator;

/// Lazily produced release chunks, newest first
pub type ChunkStream<'a> = Box<dyn Iterator<Item = Result<String, RenderError>> + 'a>;

/// Source of rendered release text
pub trait ReleaseRenderer {
    /// Versions released before the target, newest first
    fn prior_versions(&self) -> &[String];

    /// Render the target release followed by as many prior releases as configured
    fn render(&self, target_version: &str) -> ChunkStream<'_>;
}

/// Renders releases from git history and version tags
pub struct GitReleaseRenderer {
    repo: GitRepo,
    generator: ChangelogGenerator,
    /// Tags of prior releases, newest first
    tags: Vec<TagInfo>,
    /// Tag of the target release when it already exists
    current: Option<TagInfo>,
    prior_versions: Vec<String>,
    commit_path: Option<PathBuf>,
    release_count: usize,
}

impl GitReleaseRenderer {
    /// Create a renderer over the version tags carrying `tag_prefix`
    #[instrument(skip(repo, generator))]
    pub fn new(
        repo: GitRepo,
        generator: ChangelogGenerator,
        tag_prefix: &str,
    ) -> Result<Self, GitError> {
        let tags = repo.version_tags(tag_prefix)?;
        let prior_versions = tags.iter().map(|t| t.version.clone()).collect();

        Ok(Self {
            repo,
            generator,
            tags,
            current: None,
            prior_versions,
            commit_path: None,
            release_count: 1,
        })
    }

    /// Mark the version being released.
    ///
    /// When the newest tag already names it, that tag bounds the target
    /// release instead of HEAD and is no longer reported as a prior version.
    pub fn releasing(mut self, target_version: &str) -> Self {
        if self
            .tags
            .first()
            .is_some_and(|t| t.version == target_version)
        {
            let current = self.tags.remove(0);
            debug!(tag = %current.name, "target version is already tagged");
            self.prior_versions.remove(0);
            self.current = Some(current);
        }
        self
    }

    /// Only consider commits touching `path`
    pub fn with_commit_path(mut self, path: Option<PathBuf>) -> Self {
        self.commit_path = path;
        self
    }

    /// Number of releases to render; `0` renders all of them
    pub fn with_release_count(mut self, count: usize) -> Self {
        self.release_count = count;
        self
    }

    fn chunk_count(&self) -> usize {
        let available = self.tags.len() + 1;
        match self.release_count {
            0 => available,
            n => n.min(available),
        }
    }

    /// Commits and date of release `index`, where `0` is the target
    fn release_commits(&self, index: usize) -> Result<(Vec<CommitInfo>, DateTime<Utc>), GitError> {
        let path = self.commit_path.as_deref();
        let since = self.tags.get(index).map(|t| tag_ref(&t.name));

        let upper = if index == 0 {
            self.current.as_ref()
        } else {
            self.tags.get(index - 1)
        };

        match upper {
            Some(tag) => {
                let commits = self
                    .repo
                    .commits_between(since.as_deref(), &tag_ref(&tag.name), path)?;
                Ok((commits, tag.timestamp))
            }
            None if self.repo.has_commits() => {
                Ok((self.repo.commits_since(since.as_deref(), path)?, Utc::now()))
            }
            None => Ok((Vec::new(), Utc::now())),
        }
    }

    fn render_release(&self, index: usize, target_version: &str) -> Result<String, RenderError> {
        let version = if index == 0 {
            target_version
        } else {
            self.prior_versions[index - 1].as_str()
        };

        let (commits, date) = self
            .release_commits(index)
            .map_err(|source| RenderError::Git {
                version: version.to_string(),
                source,
            })?;
        debug!(version, index, commits = commits.len(), "rendering release");

        Ok(self.generator.generate_formatted(version, date, &commits))
    }
}

impl ReleaseRenderer for GitReleaseRenderer {
    fn prior_versions(&self) -> &[String] {
        &self.prior_versions
    }

    fn render(&self, target_version: &str) -> ChunkStream<'_> {
        let target = target_version.to_string();
        Box::new((0..self.chunk_count()).map(move |index| self.render_release(index, &target)))
    }
}

fn tag_ref(name: &str) -> String {
    format!("refs/tags/{}", name)
}

/// Renderer over text produced elsewhere
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    prior_versions: Vec<String>,
    chunks: Vec<Result<String, String>>,
}

impl StaticRenderer {
    /// Create a renderer with the given prior versions, newest first
    pub fn new(prior_versions: Vec<String>) -> Self {
        Self {
            prior_versions,
            chunks: Vec::new(),
        }
    }

    /// Append a rendered chunk
    pub fn with_chunk(mut self, text: impl Into<String>) -> Self {
        self.chunks.push(Ok(text.into()));
        self
    }

    /// Append a failure; the stream stops with this error when it gets here
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.chunks.push(Err(message.into()));
        self
    }
}

impl ReleaseRenderer for StaticRenderer {
    fn prior_versions(&self) -> &[String] {
        &self.prior_versions
    }

    fn render(&self, _target_version: &str) -> ChunkStream<'_> {
        Box::new(
            self.chunks
                .iter()
                .map(|chunk| chunk.clone().map_err(RenderError::Failed)),
        )
    }
}
