//! skyrelease Core - Core library for the sky_engine release tooling
//!
//! This crate provides the error taxonomy, configuration, external command
//! execution, the confirmation gate, the artifact catalog, and the staged
//! release pipeline.

pub mod artifacts;
pub mod config;
pub mod confirm;
pub mod error;
pub mod runner;
pub mod types;
pub mod workflow;

pub use artifacts::{Artifact, ArtifactCatalog, BuildConfiguration};
pub use confirm::{AnswerSource, ConfirmationGate, PromptMode, ReaderPrompt, TerminalPrompt};
pub use error::{Result, SkyReleaseError};
pub use runner::{CommandRunner, Executor, Invocation, ProcessExecutor};
pub use types::{ReleaseReport, ReleaseState, Stage};
pub use workflow::{ReleaseLayout, ReleaseOptions, ReleasePipeline, RevisionSource};
