//! Attribute-version documents (AndroidManifest.xml)
//!
//! The version lives in two namespaced attributes on the root element,
//! `versionCode` and `versionName`. Edits are made in place on the root
//! start tag; everything after it is kept as written.

use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use skyrelease_core::error::{ManifestError, Result};

use crate::version::increment_version;

/// Namespace URI of the Android resource attributes
pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";

/// Text written in front of every saved manifest
pub const MANIFEST_PREFACE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- Copyright 2015 The Chromium Authors. All rights reserved.
     Use of this source code is governed by a BSD-style license that can be
     found in the LICENSE file.
 -->
"#;

/// An XML manifest whose root element carries the version attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeVersionDocument {
    path: PathBuf,
    /// Content from the root start tag onward
    body: String,
    /// Length of the root start tag within `body`
    root_tag_len: usize,
    prefix: String,
    package: Option<String>,
    version_code: String,
    version_name: String,
}

impl AttributeVersionDocument {
    /// Parse `content` read from `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let malformed = |reason: &str| ManifestError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let start = root_element_start(content).ok_or_else(|| malformed("no root element"))?;
        let body = &content[start..];
        let root_tag_len =
            start_tag_len(body).ok_or_else(|| malformed("unterminated root element"))?;
        let root_tag = &body[..root_tag_len];

        let prefix = namespace_prefix(root_tag)
            .ok_or_else(|| malformed("root element does not declare the android namespace"))?;
        let version_code = extract_attr(root_tag, &format!("{}:versionCode", prefix))
            .ok_or_else(|| malformed("root element has no versionCode attribute"))?;
        let version_name = extract_attr(root_tag, &format!("{}:versionName", prefix))
            .ok_or_else(|| malformed("root element has no versionName attribute"))?;
        let package = extract_attr(root_tag, "package");

        Ok(Self {
            path: path.to_path_buf(),
            body: body.to_string(),
            root_tag_len,
            prefix,
            package,
            version_code,
            version_name,
        })
    }

    /// The `package` attribute of the root element, if any
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Current `versionCode`
    pub fn version_code(&self) -> &str {
        &self.version_code
    }

    /// Current `versionName`
    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Copy of this document with both version attributes incremented
    pub fn with_incremented_version(&self) -> Result<Self> {
        let version_code = increment_version(&self.version_code)?;
        let version_name = increment_version(&self.version_name)?;

        let root_tag = &self.body[..self.root_tag_len];
        let root_tag = self.replace_attr(root_tag, "versionCode", &version_code)?;
        let root_tag = self.replace_attr(&root_tag, "versionName", &version_name)?;

        Ok(Self {
            path: self.path.clone(),
            body: format!("{}{}", root_tag, &self.body[self.root_tag_len..]),
            root_tag_len: root_tag.len(),
            prefix: self.prefix.clone(),
            package: self.package.clone(),
            version_code,
            version_name,
        })
    }

    /// The full document: the fixed preface followed by the root element
    pub fn render(&self) -> String {
        format!("{}{}", MANIFEST_PREFACE, self.body)
    }

    fn replace_attr(&self, tag: &str, local_name: &str, value: &str) -> Result<String> {
        let qualified = format!("{}:{}", self.prefix, local_name);
        let re = attr_regex(&qualified).map_err(|e| ManifestError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(re
            .replacen(tag, 1, |caps: &Captures| {
                let quote = if caps.get(2).is_some() { '"' } else { '\'' };
                format!("{}{quote}{value}{quote}", &caps[1])
            })
            .into_owned())
    }
}

/// Byte offset of the first element start tag, skipping the XML
/// declaration, processing instructions, comments and doctype.
fn root_element_start(content: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(offset) = content[pos..].find('<') {
        let start = pos + offset;
        let rest = &content[start..];
        let skip = if rest.starts_with("<?") {
            rest.find("?>").map(|end| end + 2)
        } else if rest.starts_with("<!--") {
            rest.find("-->").map(|end| end + 3)
        } else if rest.starts_with("<!") {
            rest.find('>').map(|end| end + 1)
        } else {
            return Some(start);
        };
        pos = start + skip?;
    }
    None
}

/// Length of the start tag at the beginning of `body`, up to and including
/// the first `>` outside a quoted attribute value
fn start_tag_len(body: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            (Some(open), _) if open == c => quote = None,
            _ => {}
        }
    }
    None
}

/// Prefix bound to [`ANDROID_NAMESPACE`] on the root tag
fn namespace_prefix(root_tag: &str) -> Option<String> {
    let namespace = regex::escape(ANDROID_NAMESPACE);
    let pattern = format!(
        r#"\sxmlns:([A-Za-z_][\w.-]*)\s*=\s*(?:"{namespace}"|'{namespace}')"#
    );
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(root_tag))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Matches `qualified="value"` or `qualified='value'`; the value is group 2 or 3
fn attr_regex(qualified: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(\s{}\s*=\s*)(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(qualified)
    ))
}

fn extract_attr(tag: &str, qualified: &str) -> Option<String> {
    attr_regex(qualified)
        .ok()
        .and_then(|re| re.captures(tag))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
}
