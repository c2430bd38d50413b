//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for skyrelease
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream git configuration
    pub git: GitConfig,

    /// Dependency sync configuration
    pub sync: SyncConfig,

    /// Artifact storage configuration
    pub storage: StorageConfig,

    /// Package publishing configuration
    pub publish: PublishConfig,

    /// Version roll configuration
    pub roll: RollConfig,
}

/// Upstream git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote to fetch and reset to
    pub remote: String,

    /// Branch on the remote to reset to
    pub branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "upstream".to_string(),
            branch: "master".to_string(),
        }
    }
}

impl GitConfig {
    /// The `<remote>/<branch>` reference the checkout is reset to
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// Dependency sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Command line run at the checkout root
    pub command: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            command: vec!["gclient".to_string(), "sync".to_string()],
        }
    }
}

/// Artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `scheme://bucket` prefix every destination starts with
    pub bucket: String,

    /// Extensions uploaded with gzip transfer encoding
    pub compressible_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "gs://mojo/sky".to_string(),
            compressible_extensions: vec!["mojo".to_string(), "dat".to_string()],
        }
    }
}

/// Package publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Publish tool, relative to the checkout root
    pub pub_path: PathBuf,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            pub_path: PathBuf::from("third_party/dart-sdk/dart-sdk/bin/pub"),
        }
    }
}

/// Version roll configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Key-value manifests, relative to the checkout root
    pub pubspecs: Vec<PathBuf>,

    /// Attribute manifests, relative to the checkout root
    pub android_manifests: Vec<PathBuf>,

    /// Changelog file name, next to each key-value manifest
    pub changelog_file: String,

    /// Repository URL compare links are built from
    pub compare_url: String,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            pubspecs: vec![
                PathBuf::from("sky/packages/sky/pubspec.yaml"),
                PathBuf::from("sky/packages/sky_engine/pubspec.yaml"),
                PathBuf::from("sky/packages/sky_services/pubspec.yaml"),
            ],
            android_manifests: vec![PathBuf::from(
                "examples/demo_launcher/apk/AndroidManifest.xml",
            )],
            changelog_file: "CHANGELOG.md".to_string(),
            compare_url: "https://github.com/domokit/mojo".to_string(),
        }
    }
}
