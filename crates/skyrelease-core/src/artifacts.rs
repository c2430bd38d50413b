//! Build configurations, their artifacts, and where artifacts are stored

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::StorageConfig;
use crate::error::Result;
use crate::runner::CommandRunner;

/// A single named build output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Artifact {
    /// Subdirectory of the dist root, also the first path segment of the destination
    pub category: &'static str,
    /// File name
    pub name: &'static str,
}

impl Artifact {
    /// Create an artifact
    pub const fn new(category: &'static str, name: &'static str) -> Self {
        Self { category, name }
    }

    /// Path of the artifact relative to its dist root
    pub fn source_path(&self) -> PathBuf {
        Path::new(self.category).join(self.name)
    }

    /// File extension, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.name).extension().and_then(|e| e.to_str())
    }
}

const ANDROID_ARM_ARTIFACTS: &[Artifact] = &[
    Artifact::new("shell", "SkyShell.apk"),
    Artifact::new("viewer", "sky_viewer.mojo"),
    Artifact::new("viewer", "libsky_viewer_library.so"),
];

const LINUX_X64_ARTIFACTS: &[Artifact] = &[
    Artifact::new("shell", "icudtl.dat"),
    Artifact::new("shell", "sky_shell"),
    Artifact::new("shell", "sky_snapshot"),
    Artifact::new("viewer", "sky_viewer.mojo"),
    Artifact::new("viewer", "libsky_viewer_library.so"),
];

/// Supported build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildConfiguration {
    /// Android on 32-bit ARM
    #[serde(rename = "android-arm")]
    AndroidArm,
    /// Linux on x86-64
    #[serde(rename = "linux-x64")]
    LinuxX64,
}

impl BuildConfiguration {
    /// Configurations in build and upload order
    pub const ALL: [BuildConfiguration; 2] = [Self::AndroidArm, Self::LinuxX64];

    /// Returns the short identifier used in destinations
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AndroidArm => "android-arm",
            Self::LinuxX64 => "linux-x64",
        }
    }

    /// Arguments passed to `sky/tools/gn`
    pub fn gn_args(&self) -> &'static [&'static str] {
        match self {
            Self::AndroidArm => &["--android", "--release"],
            Self::LinuxX64 => &["--release"],
        }
    }

    /// Build output directory, relative to the checkout root
    pub const fn out_dir(&self) -> &'static str {
        match self {
            Self::AndroidArm => "out/android_Release",
            Self::LinuxX64 => "out/Release",
        }
    }

    /// Directory the `:dist` target populates, relative to the checkout root
    pub fn dist_dir(&self) -> PathBuf {
        Path::new(self.out_dir()).join("dist")
    }

    /// Command lines that build this configuration, in order
    pub fn build_commands(&self) -> Vec<Vec<&'static str>> {
        let mut gn = vec!["sky/tools/gn"];
        gn.extend_from_slice(self.gn_args());
        vec![gn, vec!["ninja", "-C", self.out_dir(), ":dist"]]
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildConfiguration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "android-arm" => Ok(Self::AndroidArm),
            "linux-x64" => Ok(Self::LinuxX64),
            _ => Err(format!("Unknown build configuration: {}", s)),
        }
    }
}

/// Static registry of artifacts per configuration plus the storage layout
#[derive(Debug, Clone)]
pub struct ArtifactCatalog {
    storage: StorageConfig,
}

impl ArtifactCatalog {
    /// Create a catalog uploading to the configured bucket
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    /// Artifacts of `config`, in upload order
    pub fn artifacts(&self, config: BuildConfiguration) -> &'static [Artifact] {
        match config {
            BuildConfiguration::AndroidArm => ANDROID_ARM_ARTIFACTS,
            BuildConfiguration::LinuxX64 => LINUX_X64_ARTIFACTS,
        }
    }

    /// Storage URL for `artifact`: `<bucket>/<category>/<config>/<commit_hash>/<name>`
    pub fn resolve_destination(
        &self,
        artifact: &Artifact,
        config: BuildConfiguration,
        commit_hash: &str,
    ) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.storage.bucket, artifact.category, config, commit_hash, artifact.name
        )
    }

    /// Whether `artifact` is uploaded with gzip transfer encoding
    pub fn is_compressible(&self, artifact: &Artifact) -> bool {
        artifact
            .extension()
            .is_some_and(|ext| self.storage.compressible_extensions.iter().any(|c| c == ext))
    }

    /// The `-z` value handed to `gsutil cp`
    pub fn compression_hint(&self) -> String {
        self.storage.compressible_extensions.join(",")
    }

    /// Copy command for one artifact, run from inside the dist root.
    /// `-z` is left out when no extension is compressible.
    pub fn upload_command(
        &self,
        artifact: &Artifact,
        config: BuildConfiguration,
        commit_hash: &str,
    ) -> Vec<String> {
        let mut cmd = vec!["gsutil".to_string(), "cp".to_string()];
        let hint = self.compression_hint();
        if !hint.is_empty() {
            cmd.push("-z".to_string());
            cmd.push(hint);
        }
        cmd.push(artifact.source_path().to_string_lossy().into_owned());
        cmd.push(self.resolve_destination(artifact, config, commit_hash));
        cmd
    }

    /// Upload every artifact of `config` from `dist_root`, stopping at the first failure
    #[instrument(skip(self, runner), fields(dist_root = %dist_root.display(), config = %config))]
    pub fn upload_all(
        &self,
        runner: &mut CommandRunner,
        dist_root: &Path,
        config: BuildConfiguration,
        commit_hash: &str,
    ) -> Result<usize> {
        let artifacts = self.artifacts(config);
        for artifact in artifacts {
            info!(
                artifact = artifact.name,
                compressed = self.is_compressible(artifact),
                "uploading artifact"
            );
            runner.run(dist_root, self.upload_command(artifact, config, commit_hash))?;
        }

        Ok(artifacts.len())
    }
}

impl Default for ArtifactCatalog {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}
