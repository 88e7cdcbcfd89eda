//! Commit range queries.
//!
//! A [`CommitRange`] always reads as "what is on `head` since it diverged
//! from `base`". File lists use three-dot notation (`git diff base...head`
//! diffs head against the merge base). Commit logs use two-dot notation
//! (`git log base..head` lists commits reachable from head but not base).
//! Both put the side of interest on the right, so a range never needs its
//! endpoints swapped between the two modes.
//!
//! [`RangeQuery::verify`] resolves both endpoints once and returns a
//! [`VerifiedRange`] that can run either mode without checking them again.

use std::fmt;

use crate::error::{Error, Result};
use crate::executor::{Executor, RunMode};
use crate::parse::{self, LogEntry};

/// What a range query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Changed paths, three-dot notation.
    Files,
    /// Commits with timestamp and author, two-dot notation.
    Log,
}

/// A pair of references queried in a given mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub base: String,
    pub head: String,
    pub mode: RangeMode,
}

impl CommitRange {
    /// File-list range: paths changed on `head` since the merge base.
    pub fn files(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
            mode: RangeMode::Files,
        }
    }

    /// Log range: commits on `head` that `base` does not have.
    pub fn log(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
            mode: RangeMode::Log,
        }
    }

    /// The revision-range argument for this mode.
    #[must_use]
    pub fn spec(&self) -> String {
        match self.mode {
            RangeMode::Files => format!("{}...{}", self.base, self.head),
            RangeMode::Log => format!("{}..{}", self.base, self.head),
        }
    }

    /// Full argv for the query.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        match self.mode {
            RangeMode::Files => vec![
                "git".into(),
                "diff".into(),
                "--name-only".into(),
                "-z".into(),
                self.spec(),
                "--".into(),
            ],
            RangeMode::Log => vec![
                "git".into(),
                "log".into(),
                parse::LOG_FORMAT.into(),
                self.spec(),
                "--".into(),
            ],
        }
    }
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}

/// Runs [`CommitRange`] queries through an [`Executor`].
pub struct RangeQuery<'a, E: Executor> {
    executor: &'a E,
}

impl<'a, E: Executor> RangeQuery<'a, E> {
    /// Create a range query over `executor`.
    pub const fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Check that `reference` names an existing commit.
    ///
    /// # Errors
    /// Returns error if git could not be started.
    pub fn ref_exists(&self, reference: &str) -> Result<bool> {
        let object = format!("{reference}^{{commit}}");
        let output = self.executor.run(
            &["git", "rev-parse", "--verify", "--quiet", &object],
            RunMode::Captured,
        )?;
        Ok(output.success())
    }

    /// Resolve both endpoints, once.
    ///
    /// # Errors
    /// Returns [`Error::RangeUnavailable`] naming the first missing endpoint.
    pub fn verify(&self, base: &str, head: &str) -> Result<VerifiedRange<'a, E>> {
        for reference in [base, head] {
            if !self.ref_exists(reference)? {
                tracing::debug!(base, head, missing = reference, "range unavailable");
                return Err(Error::RangeUnavailable {
                    base: base.to_owned(),
                    head: head.to_owned(),
                    missing: reference.to_owned(),
                });
            }
        }
        Ok(VerifiedRange {
            executor: self.executor,
            base: base.to_owned(),
            head: head.to_owned(),
        })
    }

    /// Run a range query and return its raw output lines.
    ///
    /// # Errors
    /// Returns [`Error::RangeUnavailable`] if either endpoint is missing,
    /// or [`Error::CommandFailed`] if the query itself fails.
    pub fn query(&self, range: &CommitRange) -> Result<Vec<String>> {
        self.verify(&range.base, &range.head)?.run(range)
    }

    /// Paths changed on `head` since its merge base with `base`.
    ///
    /// # Errors
    /// See [`RangeQuery::query`].
    pub fn files(&self, base: &str, head: &str) -> Result<Vec<String>> {
        self.verify(base, head)?.files()
    }

    /// Commits on `head` not reachable from `base`, newest first.
    ///
    /// # Errors
    /// See [`RangeQuery::query`].
    pub fn log(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        self.verify(base, head)?.log()
    }
}

/// A pair of endpoints known to exist.
pub struct VerifiedRange<'a, E: Executor> {
    executor: &'a E,
    base: String,
    head: String,
}

impl<E: Executor> VerifiedRange<'_, E> {
    fn run(&self, range: &CommitRange) -> Result<Vec<String>> {
        let argv = range.argv();
        let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
        Ok(self.executor.run_checked(&argv)?.stdout)
    }

    /// Paths changed on head since its merge base with base.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if `git diff` fails.
    pub fn files(&self) -> Result<Vec<String>> {
        let lines = self.run(&CommitRange::files(&self.base, &self.head))?;
        Ok(parse::parse_file_list(&lines))
    }

    /// Commits on head not reachable from base, newest first.
    ///
    /// # Errors
    /// Returns [`Error::CommandFailed`] if `git log` fails.
    pub fn log(&self) -> Result<Vec<LogEntry>> {
        let lines = self.run(&CommitRange::log(&self.base, &self.head))?;
        Ok(parse::parse_log(&lines))
    }
}
