//! Changelog generation

use std::io::ErrorKind;
use std::path::Path;

use skyrelease_core::error::{ChangelogError, Result};
use skyrelease_git::GitRepo;
use tracing::{debug, info, instrument};

use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::types::ChangelogEntry;

/// Builds changelog blocks from git history and prepends them to changelog files
pub struct ChangelogGenerator<'a> {
    repo: &'a GitRepo,
    repo_url: String,
    formatter: Box<dyn ChangelogFormatter>,
}

impl<'a> ChangelogGenerator<'a> {
    /// Create a generator linking comparisons under `repo_url`
    pub fn new(repo: &'a GitRepo, repo_url: impl Into<String>) -> Self {
        Self {
            repo,
            repo_url: repo_url.into(),
            formatter: Box::new(MarkdownFormatter::new()),
        }
    }

    /// Use a custom formatter
    pub fn with_formatter<F: ChangelogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Compute the entry for `version` of the package whose manifest is `manifest`.
    ///
    /// The range runs from the last commit that touched the manifest to HEAD.
    #[instrument(skip(self), fields(manifest = %manifest.display()))]
    pub fn generate(&self, manifest: &Path, version: &str) -> Result<ChangelogEntry> {
        let old = self.repo.last_commit_touching(manifest)?;
        let new = self.repo.head_ref()?;
        let commit_count = self
            .repo
            .count_commits_between(&old.short_hash, &new.short_hash)?;

        info!(version, old = %old, new = %new, commit_count, "generating changelog entry");
        Ok(ChangelogEntry::new(
            version,
            commit_count,
            old.short_hash,
            new.short_hash,
            &self.repo_url,
        ))
    }

    /// Format a changelog entry to string
    pub fn format(&self, entry: &ChangelogEntry) -> String {
        self.formatter.format(entry)
    }

    /// Generate the entry for `version` and prepend it to `changelog`
    #[instrument(skip(self), fields(changelog = %changelog.display(), manifest = %manifest.display()))]
    pub fn update(&self, changelog: &Path, manifest: &Path, version: &str) -> Result<ChangelogEntry> {
        let entry = self.generate(manifest, version)?;
        prepend_to_file(&self.format(&entry), changelog)?;
        Ok(entry)
    }
}

/// Write `text` in front of the existing contents of `path`.
///
/// The existing bytes are kept verbatim after `text`; a missing file is created.
pub fn prepend_to_file(text: &str, path: &Path) -> Result<()> {
    let existing = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no existing changelog found");
            Vec::new()
        }
        Err(source) => {
            return Err(ChangelogError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };

    let mut combined = Vec::with_capacity(text.len() + existing.len());
    combined.extend_from_slice(text.as_bytes());
    combined.extend_from_slice(&existing);

    std::fs::write(path, combined).map_err(|source| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), prepended = text.len(), kept = existing.len(), "changelog prepended");
    Ok(())
}
