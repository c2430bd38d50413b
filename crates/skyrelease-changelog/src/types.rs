//! Changelog types

use serde::Serialize;

/// One version's changelog block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    /// Version the block is headed with
    pub version: String,
    /// Commits between the previous bump and HEAD
    pub commit_count: usize,
    /// Abbreviated hash of the previous bump
    pub old_revision: String,
    /// Abbreviated hash of HEAD
    pub new_revision: String,
    /// Link comparing the two revisions
    pub compare_url: String,
}

impl ChangelogEntry {
    /// Create an entry, building the compare link from `repo_url`
    pub fn new(
        version: impl Into<String>,
        commit_count: usize,
        old_revision: impl Into<String>,
        new_revision: impl Into<String>,
        repo_url: &str,
    ) -> Self {
        let old_revision = old_revision.into();
        let new_revision = new_revision.into();
        let compare_url = format!("{}/compare/{}...{}", repo_url, old_revision, new_revision);

        Self {
            version: version.into(),
            commit_count,
            old_revision,
            new_revision,
            compare_url,
        }
    }
}
