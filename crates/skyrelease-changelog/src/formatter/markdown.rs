//! Markdown changelog formatter

use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::ChangelogEntry;

/// Markdown changelog formatter
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, entry), fields(version = %entry.version))]
    fn format(&self, entry: &ChangelogEntry) -> String {
        let output = format!(
            "## {}\n\n  - {} changes: {}\n\n",
            entry.version, entry.commit_count, entry.compare_url
        );
        debug!(output_len = output.len(), "markdown changelog formatted");
        output
    }
}
