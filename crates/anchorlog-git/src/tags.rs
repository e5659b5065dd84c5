//! Tag operations

use chrono::{TimeZone, Utc};
use semver::Version;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{version_from_tag, TagInfo};

impl GitRepo {
    /// Version tags carrying `prefix`, newest version first.
    ///
    /// Tags whose remainder is not a semantic version are skipped. Annotated
    /// and lightweight tags are both resolved to the commit they point at.
    #[instrument(skip(self))]
    pub fn version_tags(&self, prefix: &str) -> Result<Vec<TagInfo>> {
        let mut tags: Vec<(Version, TagInfo)> = Vec::new();

        for name in self.repo.tag_names(None)?.iter().flatten() {
            let Some(version) = version_from_tag(name, prefix) else {
                continue;
            };
            let Ok(parsed) = Version::parse(&version) else {
                continue;
            };

            let commit = self
                .repo
                .revparse_single(&format!("refs/tags/{}", name))?
                .peel_to_commit()?;
            let timestamp = Utc
                .timestamp_opt(commit.time().seconds(), 0)
                .single()
                .unwrap_or_else(Utc::now);

            tags.push((
                parsed,
                TagInfo::new(name, commit.id().to_string(), version, timestamp),
            ));
        }

        tags.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(count = tags.len(), prefix, "listed version tags");
        Ok(tags.into_iter().map(|(_, tag)| tag).collect())
    }
}
