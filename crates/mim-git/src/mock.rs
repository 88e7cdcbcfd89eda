//! Scripted [`Executor`] for tests.
//!
//! Responses are keyed by the full command line (argv joined with
//! spaces). Unscripted commands succeed with empty output, so a test only
//! scripts the commands whose output matters. Every call is recorded,
//! which makes "this command was never run" assertions possible.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::executor::{CommandOutput, Executor, RunMode};

/// Mock implementation of [`Executor`].
#[derive(Debug)]
pub struct MockExecutor {
    workdir: PathBuf,
    responses: RefCell<HashMap<String, VecDeque<CommandOutput>>>,
    calls: RefCell<Vec<(String, RunMode)>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("."),
            responses: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Script the output of `command`.
    ///
    /// Scripting the same command repeatedly queues responses; the last
    /// one keeps answering once the queue is drained.
    #[must_use]
    pub fn on(self, command: &str, output: CommandOutput) -> Self {
        self.responses
            .borrow_mut()
            .entry(command.to_owned())
            .or_default()
            .push_back(output);
        self
    }

    /// Script `command` to succeed with the given stdout lines.
    #[must_use]
    pub fn stdout(self, command: &str, lines: &[&str]) -> Self {
        let output = CommandOutput {
            code: 0,
            stdout: lines.iter().map(|l| (*l).to_owned()).collect(),
            stderr: Vec::new(),
        };
        self.on(command, output)
    }

    /// Script `command` to succeed with a NUL-terminated path list, as
    /// printed by `-z` queries.
    #[must_use]
    pub fn paths(self, command: &str, paths: &[&str]) -> Self {
        let stdout: String = paths.iter().map(|p| format!("{p}\0")).collect();
        self.on(command, CommandOutput::from_text(0, &stdout, ""))
    }

    /// Script `command` to fail with `code` and the given stderr.
    #[must_use]
    pub fn fail(self, command: &str, code: i32, stderr: &str) -> Self {
        self.on(command, CommandOutput::from_text(code, "", stderr))
    }

    /// Make `reference` look absent to `rev-parse --verify`.
    #[must_use]
    pub fn missing_ref(self, reference: &str) -> Self {
        let command = format!("git rev-parse --verify --quiet {reference}^{{commit}}");
        self.fail(&command, 1, "")
    }

    /// All recorded command lines, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Recorded command lines run in the given mode.
    pub fn calls_in(&self, mode: RunMode) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, m)| *m == mode)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Whether any recorded command line starts with `prefix`.
    pub fn was_called(&self, prefix: &str) -> bool {
        self.count(prefix) > 0
    }

    /// Number of recorded command lines starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(c, _)| c.starts_with(prefix))
            .count()
    }
}

impl Executor for MockExecutor {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, argv: &[&str], mode: RunMode) -> Result<CommandOutput> {
        let command = argv.join(" ");
        self.calls.borrow_mut().push((command.clone(), mode));

        let mut responses = self.responses.borrow_mut();
        let output = match responses.get_mut(&command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => CommandOutput::default(),
        };

        if mode == RunMode::Interactive {
            return Ok(CommandOutput {
                code: output.code,
                ..CommandOutput::default()
            });
        }
        Ok(output)
    }
}
