//! External command execution
//!
//! Every external tool the release drives (git, gclient, gn, ninja, gsutil,
//! pub) goes through [`CommandRunner`]. In dry-run mode commands are recorded
//! and printed but never spawned.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{CommandError, Result};

/// One recorded command invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Working directory the command runs in
    pub cwd: PathBuf,
    /// Program to run
    pub program: String,
    /// Arguments after the program
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation from a working directory and an argv
    pub fn new<I, S>(cwd: impl Into<PathBuf>, argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().ok_or(CommandError::Empty)?;

        Ok(Self {
            cwd: cwd.into(),
            program,
            args: argv.collect(),
        })
    }

    /// The argv joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RUNNING: {} IN: {}", self.command_line(), self.cwd.display())
    }
}

/// Carries out invocations the runner decides to execute
pub trait Executor {
    /// Whether `program` can be spawned at all
    fn is_available(&self, program: &str) -> bool;

    /// Run `invocation` to completion; a nonzero exit is an error
    fn execute(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .map_err(|source| CommandError::Spawn {
                command: invocation.command_line(),
                cwd: invocation.cwd.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                command: invocation.command_line(),
                cwd: invocation.cwd.clone(),
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Runs (or, in dry-run mode, records) external commands
pub struct CommandRunner {
    dry_run: bool,
    quiet: bool,
    history: Vec<Invocation>,
    executor: Box<dyn Executor>,
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("dry_run", &self.dry_run)
            .field("quiet", &self.quiet)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl CommandRunner {
    /// Create a runner; `dry_run` is fixed for its lifetime
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            quiet: false,
            history: Vec::new(),
            executor: Box::new(ProcessExecutor),
        }
    }

    /// Suppress the `RUNNING:` console line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Replace how non-dry-run commands are carried out
    pub fn with_executor<E: Executor + 'static>(mut self, executor: E) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Whether console lines are suppressed
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether commands are only recorded
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether `program` could be run by this runner
    pub fn is_available(&self, program: &str) -> bool {
        self.executor.is_available(program)
    }

    /// Every command seen so far, in order
    pub fn history(&self) -> &[Invocation] {
        &self.history
    }

    /// Consume the runner, returning its history
    pub fn into_history(self) -> Vec<Invocation> {
        self.history
    }

    /// Run `argv` in `cwd`, blocking until it exits.
    ///
    /// A nonzero exit or a failure to spawn is fatal.
    pub fn run<I, S>(&mut self, cwd: &Path, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation::new(cwd, argv)?;
        self.execute(invocation)
    }

    #[instrument(skip(self, invocation), fields(command = %invocation.command_line(), cwd = %invocation.cwd.display(), dry_run = self.dry_run))]
    fn execute(&mut self, invocation: Invocation) -> Result<()> {
        if !self.quiet {
            println!("{}", invocation);
        }
        self.history.push(invocation.clone());

        if self.dry_run {
            debug!("dry run, not executing");
            return Ok(());
        }

        let start = Instant::now();
        self.executor.execute(&invocation)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms, "command succeeded");
        Ok(())
    }
}
