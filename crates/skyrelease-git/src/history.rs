//! Commit history queries

use std::path::Path;

use git2::{Commit, ErrorCode, Oid};
use tracing::{debug, instrument};

use skyrelease_core::error::GitError;

use crate::repository::{GitRepo, Result};
use crate::types::CommitRef;

impl GitRepo {
    /// The HEAD commit as a [`CommitRef`]
    pub fn head_ref(&self) -> Result<CommitRef> {
        commit_ref(&self.head_commit()?)
    }

    /// Most recent commit reachable from HEAD that changed `path`.
    ///
    /// Follows `git log -1 -- <path>` history simplification: a commit whose
    /// entry for `path` matches a parent is skipped, and for merges only the
    /// first matching parent is followed, so side branches whose change was
    /// discarded by the merge are never reported.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn last_commit_touching(&self, path: &Path) -> Result<CommitRef> {
        let relative = self.relative_path(path)?;
        let mut commit = self.head_commit()?;

        loop {
            let current = entry_id(&commit, &relative)?;
            let mut same_parent = None;
            for parent in commit.parents() {
                if entry_id(&parent, &relative)? == current {
                    same_parent = Some(parent);
                    break;
                }
            }

            match same_parent {
                Some(parent) => commit = parent,
                None if current.is_none() && commit.parent_count() == 0 => {
                    return Err(GitError::NoCommitsFor(path.to_path_buf()))
                }
                None => {
                    let found = commit_ref(&commit)?;
                    debug!(commit = %found.short_hash, "found last commit touching path");
                    return Ok(found);
                }
            }
        }
    }

    /// Number of commits in the range `old...new`.
    ///
    /// Matches `git rev-list old...new`: commits reachable from either side
    /// but not from both.
    #[instrument(skip(self))]
    pub fn count_commits_between(&self, old: &str, new: &str) -> Result<usize> {
        let old = self.resolve(old)?;
        let new = self.resolve(new)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(old)?;
        revwalk.push(new)?;

        match self.repo.merge_bases(old, new) {
            Ok(bases) => {
                for base in bases.iter() {
                    revwalk.hide(*base)?;
                }
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!("revisions share no history");
            }
            Err(e) => return Err(e.into()),
        }

        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }

        debug!(count, "counted commits in range");
        Ok(count)
    }

    fn resolve(&self, spec: &str) -> Result<Oid> {
        Ok(self.repo.revparse_single(spec)?.peel_to_commit()?.id())
    }
}

fn commit_ref(commit: &Commit<'_>) -> Result<CommitRef> {
    let short = commit.as_object().short_id()?;
    let hash = commit.id().to_string();
    let short_hash = short
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| hash.chars().take(7).collect());

    Ok(CommitRef::new(hash, short_hash))
}

/// Blob or tree id of `path` in `commit`, if present
fn entry_id(commit: &Commit<'_>, path: &Path) -> Result<Option<Oid>> {
    match commit.tree()?.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
