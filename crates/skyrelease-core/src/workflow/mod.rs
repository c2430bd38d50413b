//! Workflow orchestration for skyrelease

mod release;

pub use release::*;
