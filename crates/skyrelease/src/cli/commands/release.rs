//! Release command

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use console::style;
use tracing::{debug, info};

use skyrelease_core::config::load_config_or_default;
use skyrelease_core::{
    CommandRunner, ConfirmationGate, ReleaseOptions, ReleasePipeline, ReleaseReport, Stage,
};
use skyrelease_git::GitRevisions;

use crate::cli::{output, OutputFormat};
use crate::exit_codes;

/// Run one release stage over a sky_engine checkout
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Root of the sky_engine checkout
    pub root: String,

    /// Publish the framework package instead of building the engine
    #[arg(long)]
    pub stage_two: bool,

    /// Print commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the pub publish steps
    #[arg(long)]
    pub no_pub_publish: bool,
}

impl ReleaseCommand {
    /// Pipeline options selected by the flags
    pub fn options(&self) -> ReleaseOptions {
        let stage = if self.stage_two { Stage::Two } else { Stage::One };
        ReleaseOptions {
            stage,
            dry_run: self.dry_run,
            publish: !self.no_pub_publish,
        }
    }

    /// Execute the release command
    pub fn execute(&self, format: OutputFormat) -> anyhow::Result<ExitCode> {
        let options = self.options();
        info!(
            root = %self.root,
            stage = %options.stage,
            dry_run = options.dry_run,
            publish = options.publish,
            "executing release command"
        );

        let root = resolve_root(&self.root)?;
        let (config, config_path) = load_config_or_default(&root)?;
        match &config_path {
            Some(path) => debug!(path = %path.display(), "using configuration file"),
            None => debug!("no configuration found, using defaults"),
        }

        let json = format == OutputFormat::Json;
        if options.dry_run && !json {
            output::warning("Dry run: commands are printed, not executed");
        }

        let runner = CommandRunner::new(options.dry_run).quiet(json);
        let gate = ConfirmationGate::terminal(options.dry_run);
        let pipeline =
            ReleasePipeline::new(&config, &root, options, gate, GitRevisions).with_runner(runner);

        let report = match pipeline.execute() {
            Ok(report) => report,
            Err(e) if e.is_declined() => {
                println!("{}", style("Aborted.").yellow());
                return Ok(ExitCode::from(exit_codes::DECLINED));
            }
            Err(e) => return Err(e.into()),
        };

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_summary(&report),
        }

        Ok(ExitCode::from(exit_codes::SUCCESS))
    }
}

/// Expand `~` and make `raw` absolute against the current directory
fn resolve_root(raw: &str) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::tilde(raw);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn print_summary(report: &ReleaseReport) {
    println!();
    println!("{}", output::header("Release Summary"));
    println!("{}", output::key_value("Stage", report.stage.as_str()));
    if let Some(hash) = &report.commit_hash {
        println!("{}", output::key_value("Commit", hash));
    }
    println!(
        "{}",
        output::key_value("Commands", &report.commands.len().to_string())
    );
    println!(
        "{}",
        output::key_value("Final state", &report.final_state().to_string())
    );
    println!();

    let verb = if report.dry_run { "Dry run of" } else { "Completed" };
    output::success(&format!("{} release stage {}", verb, report.stage));
    if !report.publish {
        output::info("Publishing was skipped");
    }
}
