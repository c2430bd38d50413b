//! skyrelease - Release and version-roll tooling for sky_engine
//!
//! Shared by the `sky-release` and `sky-roll` binaries.

pub mod cli;
pub mod exit_codes;
mod logging;

pub use logging::init_tracing;
