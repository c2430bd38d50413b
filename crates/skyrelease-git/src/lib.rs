//! skyrelease Git - Git history queries for the release tooling
//!
//! This crate answers the questions the release and roll flows ask of
//! version control: which revision HEAD is at, which commit last touched a
//! file, and how many commits separate two revisions.

mod history;
mod repository;
pub mod types;

pub use repository::{GitRepo, GitRevisions, Result};
pub use types::CommitRef;
