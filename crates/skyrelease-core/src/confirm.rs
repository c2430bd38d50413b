//! Fail-safe yes/no confirmation

use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use tracing::{debug, warn};

/// Prompt shown before any destructive release step
pub const DESTRUCTIVE_PROMPT: &str = "This tool is destructive and will revert your current branch to
upstream/master among other things.  Are you sure you wish to continue?";

/// Interpret a boolean answer string.
///
/// Accepts `y`, `yes`, `t`, `true`, `on`, `1` and `n`, `no`, `f`, `false`,
/// `off`, `0`, case-insensitively. Anything else is `None`.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Source of a single line of operator input
pub trait AnswerSource {
    /// Show `prompt` and read one answer, without its line terminator
    fn read_answer(&mut self, prompt: &str) -> io::Result<String>;
}

/// How [`TerminalPrompt`] reads its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// dialoguer line editor on the terminal
    Interactive,
    /// One plain line from stdin, prompt on stderr
    LineReader,
}

impl PromptMode {
    /// dialoguer needs both stdin and stderr attached to a terminal
    pub fn for_streams(stdin_is_terminal: bool, stderr_is_terminal: bool) -> Self {
        if stdin_is_terminal && stderr_is_terminal {
            Self::Interactive
        } else {
            Self::LineReader
        }
    }

    /// Mode for the current process's standard streams
    pub fn detect() -> Self {
        Self::for_streams(io::stdin().is_terminal(), io::stderr().is_terminal())
    }
}

/// Operator prompt on the standard streams.
///
/// Piped or redirected input is read as a plain line so that
/// `echo y | sky-release ..` still confirms.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    mode: PromptMode,
}

impl TerminalPrompt {
    /// Prompt using an explicit mode
    pub fn new(mode: PromptMode) -> Self {
        Self { mode }
    }

    /// Prompt whose mode matches the attached streams
    pub fn detect() -> Self {
        Self::new(PromptMode::detect())
    }

    /// Selected mode
    pub fn mode(&self) -> PromptMode {
        self.mode
    }
}

impl AnswerSource for TerminalPrompt {
    fn read_answer(&mut self, prompt: &str) -> io::Result<String> {
        match self.mode {
            PromptMode::Interactive => Input::<String>::new()
                .with_prompt(format!("{} (y/N)", prompt))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| io::Error::other(e.to_string())),
            PromptMode::LineReader => {
                debug!("standard streams are not a terminal, reading a plain line");
                ReaderPrompt::new(io::stdin().lock(), io::stderr()).read_answer(prompt)
            }
        }
    }
}

/// Prompt over arbitrary reader/writer pairs
pub struct ReaderPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    /// Create a prompt reading from `input` and writing to `output`
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> AnswerSource for ReaderPrompt<R, W> {
    fn read_answer(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{} (y/N) ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(trimmed.to_string())
    }
}

/// Yes/no gate in front of destructive work.
///
/// In dry-run mode the gate always passes without reading anything.
pub struct ConfirmationGate<S> {
    dry_run: bool,
    source: S,
}

impl<S: AnswerSource> ConfirmationGate<S> {
    /// Create a gate; `dry_run` is fixed for its lifetime
    pub fn new(dry_run: bool, source: S) -> Self {
        Self { dry_run, source }
    }

    /// Ask `prompt`; only an explicit affirmative answer returns true
    pub fn confirm(&mut self, prompt: &str) -> bool {
        if self.dry_run {
            debug!("dry run, skipping confirmation");
            return true;
        }

        match self.source.read_answer(prompt) {
            Ok(answer) => {
                let accepted = parse_answer(&answer).unwrap_or(false);
                debug!(answer = %answer, accepted, "confirmation answered");
                accepted
            }
            Err(e) => {
                warn!(error = %e, "could not read confirmation, treating as decline");
                false
            }
        }
    }
}

impl ConfirmationGate<TerminalPrompt> {
    /// Gate reading from the standard streams
    pub fn terminal(dry_run: bool) -> Self {
        Self::new(dry_run, TerminalPrompt::detect())
    }
}
