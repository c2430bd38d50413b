//! sky-release - Reset, build, upload and publish a sky_engine release

use std::process::ExitCode;

use clap::Parser;

use skyrelease::cli::ReleaseCli;
use skyrelease::init_tracing;

fn main() -> anyhow::Result<ExitCode> {
    let cli = ReleaseCli::parse();
    let _guard = init_tracing("sky-release", cli.verbose);

    cli.execute()
}
