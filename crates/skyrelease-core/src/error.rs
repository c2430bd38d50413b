//! Error types for skyrelease

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using SkyReleaseError
pub type Result<T> = std::result::Result<T, SkyReleaseError>;

/// Main error type for release and roll operations
#[derive(Debug, Error)]
pub enum SkyReleaseError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// External command errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Manifest-related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SkyReleaseError {
    /// Whether this error is the operator declining the confirmation prompt
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Workflow(WorkflowError::Declined))
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// External command errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command ran and exited unsuccessfully
    #[error("Command `{command}` failed in {cwd}: {status}")]
    Failed {
        command: String,
        cwd: PathBuf,
        status: String,
    },

    /// The command could not be started
    #[error("Failed to start `{command}` in {cwd}: {source}")]
    Spawn {
        command: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An empty argument vector was given
    #[error("Empty command line")]
    Empty,
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Repository has no working directory
    #[error("Repository at {0} has no working directory")]
    BareRepository(PathBuf),

    /// Path lies outside the repository working directory
    #[error("Path {path} is outside the repository at {workdir}")]
    OutsideWorkdir { path: PathBuf, workdir: PathBuf },

    /// No commit touches the path
    #[error("No commit touches {0}")]
    NoCommitsFor(PathBuf),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// The final segment is not an integer, or incrementing it overflows
    #[error("Invalid version format '{version}': {reason}")]
    InvalidFormat { version: String, reason: String },
}

/// Manifest-related errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("Failed to read manifest {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest content is not what the format expects
    #[error("Malformed manifest {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Manifest could not be written back
    #[error("Failed to write manifest {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Failed to write changelog
    #[error("Failed to write changelog {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an existing changelog
    #[error("Failed to read changelog {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The operator declined the confirmation prompt
    #[error("Release declined at confirmation prompt")]
    Declined,

    /// A required tool is not on PATH
    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(String),
}
