//! Git repository operations

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{info, instrument};

use skyrelease_core::error::GitError;
use skyrelease_core::workflow::RevisionSource;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        info!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the working directory, failing for bare repositories
    pub fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(self.path.clone()))
    }

    /// Get the HEAD commit
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head()?;
        head.peel_to_commit().map_err(GitError::Git2)
    }

    /// Full hash of the HEAD commit
    pub fn head_revision(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }

    /// Express `path` relative to the working directory
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.workdir()?;
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            workdir.join(path)
        };
        let absolute = absolute.canonicalize().unwrap_or(absolute);

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideWorkdir {
                path: absolute.clone(),
                workdir: workdir.clone(),
            })
    }
}

/// Reads HEAD of the repository at the release root
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRevisions;

impl RevisionSource for GitRevisions {
    fn head_revision(&self, root: &Path) -> skyrelease_core::Result<String> {
        Ok(GitRepo::open(root)?.head_revision()?)
    }
}
