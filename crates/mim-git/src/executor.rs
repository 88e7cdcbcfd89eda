//! Running external commands.
//!
//! The [`Executor`] trait is the only way the rest of mim reaches the
//! outside world, which lets the analysis and decision code be tested
//! against scripted output.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// How a command's standard streams are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Capture stdout and stderr as lines.
    Captured,
    /// Connect the child directly to the controlling terminal.
    Interactive,
}

/// Structured result of running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code (1 when the process was killed by a signal).
    pub code: i32,
    /// Captured stdout lines, trailing blank lines stripped.
    pub stdout: Vec<String>,
    /// Captured stderr lines, trailing blank lines stripped.
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// Build an output from raw captured text.
    #[must_use]
    pub fn from_text(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            code,
            stdout: split_lines(stdout),
            stderr: split_lines(stderr),
        }
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Split captured text into lines, dropping trailing blank entries.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Runs external commands in a working directory.
///
/// Calls block until the child exits. There is no timeout and no
/// cancellation hook: a hung tool hangs the caller.
#[allow(clippy::missing_errors_doc)]
pub trait Executor {
    /// Directory commands run in.
    fn workdir(&self) -> &Path;

    /// Run `argv` and report its exit status and output.
    ///
    /// A non-zero exit is not an error here; only failing to start the
    /// process is.
    fn run(&self, argv: &[&str], mode: RunMode) -> Result<CommandOutput>;

    /// Run `argv` captured, turning a non-zero exit into [`Error::CommandFailed`].
    fn run_checked(&self, argv: &[&str]) -> Result<CommandOutput> {
        let output = self.run(argv, RunMode::Captured)?;
        ensure_success(argv, output)
    }

    /// Run `argv` attached to the terminal, failing on a non-zero exit.
    fn run_interactive(&self, argv: &[&str]) -> Result<()> {
        let output = self.run(argv, RunMode::Interactive)?;
        ensure_success(argv, output).map(|_| ())
    }
}

fn ensure_success(argv: &[&str], output: CommandOutput) -> Result<CommandOutput> {
    if output.success() {
        Ok(output)
    } else {
        let mut captured = output.stdout;
        captured.extend(output.stderr);
        Err(Error::CommandFailed {
            command: argv.join(" "),
            code: output.code,
            output: captured,
        })
    }
}

/// [`Executor`] backed by `std::process::Command`.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    workdir: PathBuf,
}

impl SystemExecutor {
    /// Create an executor running commands in `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl Executor for SystemExecutor {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, argv: &[&str], mode: RunMode) -> Result<CommandOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(CommandOutput::default());
        };

        tracing::debug!(command = %argv.join(" "), workdir = %self.workdir.display(), ?mode, "running");

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.workdir);

        let spawn_err = |source| Error::Spawn {
            command: argv.join(" "),
            source,
        };

        match mode {
            RunMode::Captured => {
                // Output is parsed, so keep git's messages untranslated.
                let out = cmd
                    .env("LC_ALL", "C")
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .map_err(spawn_err)?;
                let output = CommandOutput::from_text(
                    out.status.code().unwrap_or(1),
                    &String::from_utf8_lossy(&out.stdout),
                    &String::from_utf8_lossy(&out.stderr),
                );
                tracing::trace!(code = output.code, stdout = ?output.stdout, stderr = ?output.stderr, "finished");
                Ok(output)
            }
            RunMode::Interactive => {
                let status = cmd.status().map_err(spawn_err)?;
                Ok(CommandOutput {
                    code: status.code().unwrap_or(1),
                    ..CommandOutput::default()
                })
            }
        }
    }
}
