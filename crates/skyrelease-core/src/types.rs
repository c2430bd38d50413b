//! Core types for skyrelease

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifacts::BuildConfiguration;
use crate::runner::Invocation;

/// Which phase of the release an invocation performs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Sync, build, stamp, upload, publish the engine packages
    #[default]
    One,
    /// Publish the framework package only
    Two,
}

impl Stage {
    /// Returns the string representation of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Two => "two",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of the release state machine, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    /// Nothing has happened yet
    Init,
    /// Operator confirmed (or dry-run bypassed the prompt)
    Confirmed,
    /// Checkout reset to upstream
    UpstreamReset,
    /// Dependencies synced and commit hash captured
    SourceSynced,
    /// One configuration built
    Built(BuildConfiguration),
    /// Revision marker written
    RevisionStamped,
    /// One configuration's artifacts uploaded
    Uploaded(BuildConfiguration),
    /// All packages for the stage published
    Published,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Confirmed => f.write_str("confirmed"),
            Self::UpstreamReset => f.write_str("upstream-reset"),
            Self::SourceSynced => f.write_str("source-synced"),
            Self::Built(config) => write!(f, "built({})", config),
            Self::RevisionStamped => f.write_str("revision-stamped"),
            Self::Uploaded(config) => write!(f, "uploaded({})", config),
            Self::Published => f.write_str("published"),
        }
    }
}

/// Summary of a completed release run
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    /// Stage that ran
    pub stage: Stage,
    /// Whether commands were only recorded
    pub dry_run: bool,
    /// Whether publishing was enabled
    pub publish: bool,
    /// Commit hash captured after dependency sync
    pub commit_hash: Option<String>,
    /// States reached, in order
    pub states: Vec<ReleaseState>,
    /// Commands run (or recorded), in order
    pub commands: Vec<Invocation>,
}

impl ReleaseReport {
    /// Final state reached
    pub fn final_state(&self) -> ReleaseState {
        self.states.last().copied().unwrap_or(ReleaseState::Init)
    }
}
