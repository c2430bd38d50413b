//! Git types

/// A commit identified by full and abbreviated hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Commit hash (full)
    pub hash: String,
    /// Abbreviated hash, unique within the repository
    pub short_hash: String,
}

impl CommitRef {
    /// Create a new CommitRef
    pub fn new(hash: impl Into<String>, short_hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            short_hash: short_hash.into(),
        }
    }
}

impl std::fmt::Display for CommitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_hash)
    }
}
