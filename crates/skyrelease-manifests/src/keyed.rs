//! Keyed-version documents (pubspec.yaml)

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use skyrelease_core::error::{ManifestError, Result};

use crate::version::increment_version;

/// A YAML mapping with top-level `name` and `version` keys
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedVersionDocument {
    path: PathBuf,
    mapping: Mapping,
    name: String,
    version: String,
}

impl KeyedVersionDocument {
    /// Parse `content` read from `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let malformed = |reason: String| ManifestError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let value: Value =
            serde_yaml::from_str(content).map_err(|e| malformed(format!("invalid YAML: {}", e)))?;
        let Value::Mapping(mapping) = value else {
            return Err(malformed("top level is not a mapping".to_string()).into());
        };

        let name = match mapping.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(malformed("'name' is not a string".to_string()).into()),
            None => return Err(malformed("missing 'name'".to_string()).into()),
        };
        let version = match mapping.get("version") {
            Some(Value::String(version)) => version.clone(),
            // `version: 1.10` parses as the float 1.1; the written text is the version
            Some(Value::Number(_)) => raw_top_level_scalar(content, "version").ok_or_else(|| {
                malformed("unquoted 'version' is not a plain top-level scalar".to_string())
            })?,
            Some(_) => return Err(malformed("'version' is not a scalar".to_string()).into()),
            None => return Err(malformed("missing 'version'".to_string()).into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            mapping,
            name,
            version,
        })
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current version string
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Copy of this document with the version incremented
    pub fn with_incremented_version(&self) -> Result<Self> {
        let version = increment_version(&self.version)?;
        let mut mapping = self.mapping.clone();
        mapping.insert(Value::from("version"), Value::from(version.clone()));

        Ok(Self {
            path: self.path.clone(),
            mapping,
            name: self.name.clone(),
            version,
        })
    }

    /// Serialize the whole mapping back to YAML
    pub fn render(&self) -> Result<String> {
        serde_yaml::to_string(&self.mapping).map_err(|e| {
            ManifestError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Source text of the block-style top-level `key: scalar` line
fn raw_top_level_scalar(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.strip_prefix(key)?.trim_start().strip_prefix(':')?;
        let value = value.split(" #").next().unwrap_or(value).trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
