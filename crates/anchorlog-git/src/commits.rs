//! Commit history operations

use std::path::Path;

use chrono::{TimeZone, Utc};
use git2::{DiffOptions, Oid, Sort};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from `until` but not from `since`, newest first.
    ///
    /// `since = None` walks back to the root commit. With `path` set, only
    /// commits that change something under that path are returned.
    #[instrument(skip(self))]
    pub fn commits_between(
        &self,
        since: Option<&str>,
        until: &str,
        path: Option<&Path>,
    ) -> Result<Vec<CommitInfo>> {
        let until_oid = self.repo.revparse_single(until)?.peel_to_commit()?.id();
        let since_oid = match since {
            Some(rev) => Some(self.repo.revparse_single(rev)?.peel_to_commit()?.id()),
            None => None,
        };
        self.walk(until_oid, since_oid, path)
    }

    /// Commits on HEAD since `since` (or all of history), newest first
    pub fn commits_since(&self, since: Option<&str>, path: Option<&Path>) -> Result<Vec<CommitInfo>> {
        let head = self.head_commit()?.id();
        let since_oid = match since {
            Some(rev) => Some(self.repo.revparse_single(rev)?.peel_to_commit()?.id()),
            None => None,
        };
        self.walk(head, since_oid, path)
    }

    fn walk(&self, until: Oid, since: Option<Oid>, path: Option<&Path>) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(until)?;
        if let Some(since) = since {
            revwalk.hide(since)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            if let Some(path) = path {
                if !self.touches_path(&commit, path)? {
                    continue;
                }
            }
            commits.push(commit_to_info(&commit));
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    /// Whether a commit changes anything under `path` relative to its first parent
    fn touches_path(&self, commit: &git2::Commit<'_>, path: &Path) -> Result<bool> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        opts.pathspec(self.relative_path(path));
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        Ok(diff.deltas().len() > 0)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();
    let message = commit.summary().unwrap_or("(no message)").to_string();
    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        message,
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(commit.body().unwrap_or_default())
}
