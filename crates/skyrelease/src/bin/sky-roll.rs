//! sky-roll - Bump package and APK versions and update changelogs

use clap::Parser;

use skyrelease::cli::RollCli;
use skyrelease::init_tracing;

fn main() -> anyhow::Result<()> {
    let cli = RollCli::parse();
    let _guard = init_tracing("sky-roll", false);

    cli.execute()
}
