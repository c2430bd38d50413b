//! CLI definitions for both binaries

pub mod commands;
pub mod output;

use std::process::ExitCode;

use clap::Parser;

use commands::{ReleaseCommand, RollCommand};

/// Reset to upstream, build, upload and publish a sky_engine release
#[derive(Debug, Parser)]
#[command(name = "sky-release")]
#[command(author, version, about, long_about = None)]
pub struct ReleaseCli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub command: ReleaseCommand,
}

impl ReleaseCli {
    /// Execute the release
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        self.command.execute(self.format)
    }
}

/// Bump pubspec and APK versions and prepend changelog entries
#[derive(Debug, Parser)]
#[command(name = "sky-roll")]
#[command(author, version, about, long_about = None)]
pub struct RollCli {
    #[command(flatten)]
    pub command: RollCommand,
}

impl RollCli {
    /// Execute the roll in the current directory
    pub fn execute(self) -> anyhow::Result<()> {
        self.command.execute()
    }
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}
