//! Live branch and working-tree state.
//!
//! [`BranchState`] answers point questions about the checked-out branch,
//! and [`BranchState::read`] collects them into a [`RepositoryState`]
//! snapshot. Snapshots are never updated in place: after any mutating git
//! command, read a fresh one.

use chrono::{DateTime, Utc};
use mim_git::{Executor, RunMode, StatusSummary, parse};
use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;

/// A working-tree file that differs from the branch tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirtyFile {
    /// Path relative to the work-tree root.
    pub path: String,
    /// Last modification time; `None` when the file was deleted.
    pub modified: Option<DateTime<Utc>>,
}

/// Snapshot of the repository taken at the start of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryState {
    /// Checked-out branch (the branch being rebased while a rebase runs).
    pub branch: String,
    /// Whether the branch has an upstream configured.
    pub tracked: bool,
    /// A rebase has been started and not completed or aborted.
    pub rebase_in_progress: bool,
    /// Status reports the branch behind its upstream.
    pub behind_upstream: bool,
    /// Files changed relative to the branch tip.
    pub uncommitted: Vec<DirtyFile>,
    /// Files git does not know about.
    pub untracked: Vec<String>,
}

impl RepositoryState {
    /// Whether there are uncommitted changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.uncommitted.is_empty()
    }

    /// Paths of the uncommitted files.
    #[must_use]
    pub fn uncommitted_paths(&self) -> Vec<String> {
        self.uncommitted.iter().map(|f| f.path.clone()).collect()
    }
}

/// Reads branch and working-tree state through an [`Executor`].
pub struct BranchState<'a, E: Executor> {
    executor: &'a E,
    settings: &'a Settings,
}

impl<'a, E: Executor> BranchState<'a, E> {
    pub const fn new(executor: &'a E, settings: &'a Settings) -> Self {
        Self { executor, settings }
    }

    /// Name of the checked-out branch.
    ///
    /// # Errors
    /// Returns `DetachedHead` if HEAD is not on a named branch.
    pub fn current_branch(&self) -> Result<String> {
        let output = self
            .executor
            .run_checked(&["git", "branch", "--show-current"])?;
        parse::parse_config_value(&output.stdout).ok_or_else(|| mim_git::Error::DetachedHead.into())
    }

    /// Fetch from the configured remote, unless fetching is disabled.
    ///
    /// Failure is logged, not returned: analysis carries on with whatever
    /// remote-tracking refs are already present.
    pub fn fetch(&self) {
        if !self.settings.fetch() {
            return;
        }
        match self.executor.run_checked(&["git", "fetch", self.settings.remote()]) {
            Ok(_) => {}
            Err(e) => tracing::warn!(remote = self.settings.remote(), error = %e, "fetch failed"),
        }
    }

    /// Whether `branch` has an upstream configured.
    ///
    /// Fetches first so that the answer, and every remote-tracking ref
    /// read afterwards, reflect the remote's latest state.
    ///
    /// # Errors
    /// Returns error if git could not be run.
    pub fn tracks_remote(&self, branch: &str) -> Result<bool> {
        self.fetch();
        let key = format!("branch.{branch}.merge");
        let output = self
            .executor
            .run(&["git", "config", "--get", &key], RunMode::Captured)?;
        Ok(output.success() && parse::parse_config_value(&output.stdout).is_some())
    }

    /// Facts from long-format `git status`.
    ///
    /// # Errors
    /// Returns error if `git status` fails.
    pub fn status(&self) -> Result<StatusSummary> {
        let output = self.executor.run_checked(&["git", "status"])?;
        Ok(parse::parse_status(&output.stdout))
    }

    /// Whether a rebase has been started and not yet finished.
    ///
    /// # Errors
    /// Returns error if `git status` fails.
    pub fn rebase_in_progress(&self) -> Result<bool> {
        Ok(self.status()?.rebase_in_progress)
    }

    /// Files modified relative to the branch tip, staged or not.
    ///
    /// # Errors
    /// Returns error if git could not be run.
    pub fn uncommitted(&self) -> Result<Vec<DirtyFile>> {
        let output = self
            .executor
            .run(&["git", "diff", "--name-only", "-z", "HEAD"], RunMode::Captured)?;
        let lines = if output.success() {
            output.stdout
        } else {
            // No commit yet: everything staged counts.
            tracing::debug!("HEAD has no commit, listing staged files");
            self.executor
                .run_checked(&["git", "diff", "--name-only", "-z", "--cached"])?
                .stdout
        };

        Ok(parse::parse_file_list(&lines)
            .into_iter()
            .map(|path| {
                let modified = std::fs::metadata(self.executor.workdir().join(&path))
                    .and_then(|m| m.modified())
                    .ok()
                    .map(DateTime::<Utc>::from);
                DirtyFile { path, modified }
            })
            .collect())
    }

    /// Untracked, non-ignored files.
    ///
    /// # Errors
    /// Returns error if `git ls-files` fails.
    pub fn untracked(&self) -> Result<Vec<String>> {
        let output = self
            .executor
            .run_checked(&["git", "ls-files", "-z", "--others", "--exclude-standard"])?;
        Ok(parse::parse_file_list(&output.stdout))
    }

    /// Take a [`RepositoryState`] snapshot.
    ///
    /// # Errors
    /// Returns `DetachedHead` when HEAD is detached outside of a rebase,
    /// or any git failure.
    pub fn read(&self) -> Result<RepositoryState> {
        let branch = match self.current_branch() {
            Ok(branch) => branch,
            Err(e) if e.is_detached_head() => {
                // A rebase detaches HEAD; status still names the branch.
                let status = self.status()?;
                match (status.rebase_in_progress, status.rebasing_branch) {
                    (true, Some(branch)) => branch,
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        let tracked = self.tracks_remote(&branch)?;
        let status = self.status()?;

        Ok(RepositoryState {
            branch,
            tracked,
            rebase_in_progress: status.rebase_in_progress,
            behind_upstream: status.behind_upstream,
            uncommitted: self.uncommitted()?,
            untracked: self.untracked()?,
        })
    }

    /// Whether a local branch called `name` exists.
    ///
    /// # Errors
    /// Returns error if git could not be run.
    pub fn local_branch_exists(&self, name: &str) -> Result<bool> {
        let reference = format!("refs/heads/{name}");
        let output = self.executor.run(
            &["git", "rev-parse", "--verify", "--quiet", &reference],
            RunMode::Captured,
        )?;
        Ok(output.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mim_git::mock::MockExecutor;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn current_branch_reads_show_current() {
        let exec = MockExecutor::new().stdout("git branch --show-current", &["feature/login"]);
        let settings = settings();
        let state = BranchState::new(&exec, &settings);
        assert_eq!(state.current_branch().unwrap(), "feature/login");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn empty_branch_name_is_detached_head() {
        let exec = MockExecutor::new();
        let settings = settings();
        let state = BranchState::new(&exec, &settings);
        let err = state.current_branch().unwrap_err();
        assert!(err.is_detached_head());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn tracks_remote_fetches_first() {
        let exec = MockExecutor::new().stdout(
            "git config --get branch.feature.merge",
            &["refs/heads/feature"],
        );
        let settings = settings();
        let state = BranchState::new(&exec, &settings);

        assert!(state.tracks_remote("feature").unwrap());
        assert_eq!(
            exec.calls(),
            vec!["git fetch origin", "git config --get branch.feature.merge"]
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn tracks_remote_false_when_unset_and_fetch_failure_tolerated() {
        let exec = MockExecutor::new()
            .fail("git fetch origin", 128, "fatal: 'origin' does not appear to be a git repository")
            .fail("git config --get branch.feature.merge", 1, "");
        let settings = settings();
        let state = BranchState::new(&exec, &settings);
        assert!(!state.tracks_remote("feature").unwrap());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn fetch_can_be_disabled() {
        let exec = MockExecutor::new();
        let settings = Settings::resolve(
            &crate::Config::default(),
            crate::config::Overrides {
                no_fetch: true,
                ..Default::default()
            },
        );
        let state = BranchState::new(&exec, &settings);
        state.tracks_remote("feature").unwrap();
        assert!(!exec.was_called("git fetch"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn rebase_marker_detected() {
        let exec = MockExecutor::new().stdout(
            "git status",
            &["interactive rebase in progress; onto 0a1b2c3"],
        );
        let settings = settings();
        assert!(BranchState::new(&exec, &settings).rebase_in_progress().unwrap());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn read_uses_rebasing_branch_when_detached() {
        let exec = MockExecutor::new().stdout(
            "git status",
            &[
                "interactive rebase in progress; onto 0a1b2c3",
                "You are currently rebasing branch 'feature' on '0a1b2c3'.",
            ],
        );
        let settings = settings();
        let repo = BranchState::new(&exec, &settings).read().unwrap();
        assert_eq!(repo.branch, "feature");
        assert!(repo.rebase_in_progress);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn read_collects_working_tree() {
        let exec = MockExecutor::new()
            .stdout("git branch --show-current", &["feature"])
            .paths("git diff --name-only -z HEAD", &["src/lib.rs", "gone.txt"])
            .paths(
                "git ls-files -z --others --exclude-standard",
                &["notes.md", "scratch.txt"],
            );
        let settings = settings();
        let repo = BranchState::new(&exec, &settings).read().unwrap();

        assert_eq!(repo.branch, "feature");
        assert!(!repo.tracked);
        assert!(repo.is_dirty());
        assert_eq!(repo.uncommitted_paths(), vec!["src/lib.rs", "gone.txt"]);
        // Paths don't exist relative to the mock workdir.
        assert!(repo.uncommitted.iter().all(|f| f.modified.is_none()));
        assert_eq!(repo.untracked.len(), 2);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn uncommitted_falls_back_without_head() {
        let exec = MockExecutor::new()
            .fail("git diff --name-only -z HEAD", 128, "fatal: bad revision 'HEAD'")
            .paths("git diff --name-only -z --cached", &["first.txt"]);
        let settings = settings();
        let files = BranchState::new(&exec, &settings).uncommitted().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "first.txt");
    }
}
