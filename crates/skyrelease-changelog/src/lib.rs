//! skyrelease Changelog - Changelog generation for the release tooling
//!
//! Each package changelog gains one block per version roll, stating how many
//! commits landed since the manifest was last bumped and linking to the
//! comparison between the two revisions.

pub mod formatter;
pub mod generator;
pub mod types;

pub use formatter::{ChangelogFormatter, MarkdownFormatter};
pub use generator::{prepend_to_file, ChangelogGenerator};
pub use types::ChangelogEntry;
