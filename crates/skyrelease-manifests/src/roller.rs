//! Version rolling over a fixed registry of manifests

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skyrelease_core::config::RollConfig;
use skyrelease_core::error::Result;
use tracing::{info, instrument};

use crate::document::{ManifestDocument, ManifestFormat};

/// One registered manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Absolute path to the manifest
    pub path: PathBuf,
    /// How the manifest stores its version
    pub format: ManifestFormat,
}

impl ManifestEntry {
    /// Create an entry for the manifest at `path`
    pub fn new(path: impl Into<PathBuf>, format: ManifestFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

/// The manifests `sky-roll` bumps, keyed-version documents first
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
    entries: Vec<ManifestEntry>,
}

impl ManifestRegistry {
    /// Resolve the configured manifest paths against `root`
    pub fn from_config(root: &Path, config: &RollConfig) -> Self {
        let keyed = config
            .pubspecs
            .iter()
            .map(|p| ManifestEntry::new(root.join(p), ManifestFormat::KeyedVersion));
        let attribute = config
            .android_manifests
            .iter()
            .map(|p| ManifestEntry::new(root.join(p), ManifestFormat::AttributeVersion));

        Self {
            entries: keyed.chain(attribute).collect(),
        }
    }

    /// All entries in processing order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Entries of one format, in registry order
    pub fn of_format(&self, format: ManifestFormat) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(move |e| e.format == format)
    }
}

/// Result of bumping one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    /// Display name: the pubspec `name`, the manifest `package`, or the path
    pub name: String,
    /// File that was rewritten
    pub path: PathBuf,
    /// Format of the file
    pub format: ManifestFormat,
    /// Version before the bump (`version` or `versionName`)
    pub old_version: String,
    /// Version written to the file
    pub new_version: String,
    /// `versionCode` before the bump; attribute manifests only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_code: Option<String>,
    /// `versionCode` written to the file; attribute manifests only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_code: Option<String>,
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old_code, &self.new_code) {
            (Some(old_code), Some(new_code)) => write!(
                f,
                "{:>20}  {:>6} ({}) => {:>6} ({})",
                self.name, self.old_version, old_code, self.new_version, new_code
            ),
            _ => write!(
                f,
                "{:>20}  {:>6} => {:>6}",
                self.name, self.old_version, self.new_version
            ),
        }
    }
}

/// Reads a manifest, increments its version and writes it back
#[derive(Debug, Default, Clone, Copy)]
pub struct VersionRoller;

impl VersionRoller {
    /// Create a roller
    pub fn new() -> Self {
        Self
    }

    /// Bump the manifest described by `entry`.
    ///
    /// The file is only written once the new version has been computed, so a
    /// malformed manifest is left untouched.
    #[instrument(skip(self), fields(path = %entry.path.display(), format = %entry.format))]
    pub fn roll(&self, entry: &ManifestEntry) -> Result<RollOutcome> {
        let current = ManifestDocument::load(&entry.path, entry.format)?;
        let next = current.with_incremented_version()?;
        next.save(&entry.path)?;

        let outcome = RollOutcome {
            name: current.name(&entry.path),
            path: entry.path.clone(),
            format: entry.format,
            old_version: current.current_version().to_string(),
            new_version: next.current_version().to_string(),
            old_code: current.version_code().map(str::to_string),
            new_code: next.version_code().map(str::to_string),
        };

        info!(
            name = %outcome.name,
            old = %outcome.old_version,
            new = %outcome.new_version,
            "rolled manifest version"
        );
        Ok(outcome)
    }
}
