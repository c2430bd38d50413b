//! CLI commands

mod release;
mod roll;

pub use release::ReleaseCommand;
pub use roll::RollCommand;
