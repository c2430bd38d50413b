//! Format dispatch over the versioned manifest kinds

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skyrelease_core::error::{ManifestError, Result};
use tracing::{debug, instrument};

use crate::attribute::AttributeVersionDocument;
use crate::keyed::KeyedVersionDocument;

/// How a manifest stores its version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    /// YAML mapping with a `version` key (pubspec.yaml)
    KeyedVersion,
    /// XML root element with `versionCode`/`versionName` attributes (AndroidManifest.xml)
    AttributeVersion,
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyedVersion => write!(f, "keyed-version"),
            Self::AttributeVersion => write!(f, "attribute-version"),
        }
    }
}

/// A loaded manifest of either format
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestDocument {
    /// YAML with a top-level `version` key (pubspec.yaml)
    Keyed(KeyedVersionDocument),
    /// XML with version attributes on the root element (AndroidManifest.xml)
    Attribute(AttributeVersionDocument),
}

impl ManifestDocument {
    /// Read and parse the manifest at `path`
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path, format: ManifestFormat) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let document = match format {
            ManifestFormat::KeyedVersion => Self::Keyed(KeyedVersionDocument::parse(path, &content)?),
            ManifestFormat::AttributeVersion => {
                Self::Attribute(AttributeVersionDocument::parse(path, &content)?)
            }
        };

        debug!(version = document.current_version(), "loaded manifest");
        Ok(document)
    }

    /// Format of this document
    pub fn format(&self) -> ManifestFormat {
        match self {
            Self::Keyed(_) => ManifestFormat::KeyedVersion,
            Self::Attribute(_) => ManifestFormat::AttributeVersion,
        }
    }

    /// The human-facing version (`version` or `versionName`)
    pub fn current_version(&self) -> &str {
        match self {
            Self::Keyed(doc) => doc.version(),
            Self::Attribute(doc) => doc.version_name(),
        }
    }

    /// The integer build code, for formats that have one
    pub fn version_code(&self) -> Option<&str> {
        match self {
            Self::Keyed(_) => None,
            Self::Attribute(doc) => Some(doc.version_code()),
        }
    }

    /// Display name: package name for pubspecs, `package` attribute for
    /// Android manifests (falling back to the file path)
    pub fn name(&self, path: &Path) -> String {
        match self {
            Self::Keyed(doc) => doc.name().to_string(),
            Self::Attribute(doc) => doc
                .package()
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// Copy with every version field of the format incremented
    pub fn with_incremented_version(&self) -> Result<Self> {
        Ok(match self {
            Self::Keyed(doc) => Self::Keyed(doc.with_incremented_version()?),
            Self::Attribute(doc) => Self::Attribute(doc.with_incremented_version()?),
        })
    }

    /// Serialize the full document
    pub fn render(&self) -> Result<String> {
        match self {
            Self::Keyed(doc) => doc.render(),
            Self::Attribute(doc) => Ok(doc.render()),
        }
    }

    /// Overwrite `path` with the rendered document
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        std::fs::write(path, rendered).map_err(|e| ManifestError::WriteFailed {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), version = self.current_version(), "saved manifest");
        Ok(())
    }
}
