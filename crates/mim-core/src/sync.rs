//! Sync decision engine.
//!
//! Decisions are pure functions of a [`RepositoryState`] and a
//! [`DivergenceReport`]: they either block with a [`Blocker`], report
//! that nothing needs doing, or produce a [`SyncPlan`] of git commands.
//! [`SyncEngine`] reads the state, then the report, then decides, and
//! finally executes the plan, stopping at the first failing command.
//!
//! Analysis and execution are not atomic: another process fetching or
//! committing between the two can invalidate a decision.

use std::fmt;

use mim_git::{Executor, RunMode};

use crate::branch::{BranchState, RepositoryState};
use crate::branch_name::BranchName;
use crate::config::Settings;
use crate::divergence::{DivergenceAnalyzer, DivergenceReport};
use crate::error::Result;

/// A precondition that stops an action before any mutating command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    /// A rebase is waiting to be continued or aborted.
    RebaseInProgress,
    /// Uncommitted changes would be mixed into the operation.
    DirtyWorkingTree { files: Vec<String> },
    /// The action needs a developer branch, not main.
    OnMainBranch { main: String },
    /// The remote copy has commits the local branch lacks.
    RemoteAhead {
        remote_ref: String,
        commits: usize,
        files: usize,
    },
    /// Creating the integration branch locally is not allowed.
    CannotCreateMain { main: String },
    /// The remote already points somewhere else.
    RemoteMismatch { remote: String, existing: String },
    /// `init` inside an existing repository.
    AlreadyRepository,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RebaseInProgress => {
                write!(f, "a rebase is in progress - run `mim rebase` to continue it")
            }
            Self::DirtyWorkingTree { files } => write!(
                f,
                "{} uncommitted file(s) - commit local changes first",
                files.len()
            ),
            Self::OnMainBranch { main } => {
                write!(f, "on {main} branch - must be on a developer branch")
            }
            Self::RemoteAhead {
                remote_ref,
                commits,
                files,
            } => write!(
                f,
                "{remote_ref} has {commits} commit(s) touching {files} file(s) not in the local branch - pull or rebase first"
            ),
            Self::CannotCreateMain { main } => write!(f, "cannot create {main} branch"),
            Self::RemoteMismatch { remote, existing } => {
                write!(f, "remote {remote} already points at {existing}")
            }
            Self::AlreadyRepository => f.write_str("already a git repository"),
        }
    }
}

/// Why nothing needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Noop {
    /// The branch already contains everything on main.
    UpToDate { branch: String, main: String },
    /// Already on the requested branch.
    AlreadyOn { branch: String },
    /// No untracked files to stage.
    NothingToAdd,
    /// The remote already has the requested URL.
    RemoteSet { remote: String, url: String },
}

impl fmt::Display for Noop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate { branch, main } => {
                write!(f, "nothing to rebase, {branch} is up to date with {main}")
            }
            Self::AlreadyOn { branch } => write!(f, "already on {branch}"),
            Self::NothingToAdd => f.write_str("no untracked files to add"),
            Self::RemoteSet { remote, url } => write!(f, "remote {remote} is already {url}"),
        }
    }
}

/// What a plan accomplishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Continue an interrupted rebase.
    ResumeRebase,
    /// Push, creating the upstream when `set_upstream`.
    Push { set_upstream: bool },
    /// Fast-forward main from its remote copy.
    FastForwardMain,
    /// Replay the branch on top of the remote main.
    RebaseOntoMain,
    /// Merge the branch into main and publish it.
    Release { branch: String },
    /// Switch to an existing branch.
    Switch { branch: String },
    /// Create a branch and switch to it.
    Create { branch: String },
    /// Stage untracked files.
    Stage { files: usize },
    /// Register the remote.
    AddRemote { remote: String, url: String },
    /// Create the repository, commit everything and publish main.
    Init { remote: String, url: String },
}

/// One command in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub argv: Vec<String>,
    pub mode: RunMode,
}

impl Step {
    pub(crate) fn captured(argv: &[&str]) -> Self {
        Self {
            argv: argv.iter().map(|a| (*a).to_owned()).collect(),
            mode: RunMode::Captured,
        }
    }

    fn interactive(argv: &[&str]) -> Self {
        Self {
            mode: RunMode::Interactive,
            ..Self::captured(argv)
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// Ordered commands carrying out an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub action: Action,
    pub steps: Vec<Step>,
}

/// Outcome of a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Blocked(Blocker),
    Noop(Noop),
    Run(SyncPlan),
}

/// Decide whether and how to push the current branch.
#[must_use]
pub fn decide_push(
    state: &RepositoryState,
    report: &DivergenceReport,
    settings: &Settings,
) -> Decision {
    if state.rebase_in_progress {
        return Decision::Blocked(Blocker::RebaseInProgress);
    }
    if state.is_dirty() {
        return Decision::Blocked(Blocker::DirtyWorkingTree {
            files: state.uncommitted_paths(),
        });
    }
    if settings.is_main(&state.branch) {
        return Decision::Blocked(Blocker::OnMainBranch {
            main: settings.main_branch().to_owned(),
        });
    }
    let remote_ahead = &report.remote_ahead_of_local;
    if !remote_ahead.is_empty() {
        return Decision::Blocked(Blocker::RemoteAhead {
            remote_ref: settings.remote_ref(&state.branch),
            commits: remote_ahead.commits,
            files: remote_ahead.file_count(),
        });
    }

    let (set_upstream, step) = if state.tracked {
        (false, Step::captured(&["git", "push"]))
    } else {
        (
            true,
            Step::captured(&["git", "push", "-u", settings.remote(), &state.branch]),
        )
    };
    Decision::Run(SyncPlan {
        action: Action::Push { set_upstream },
        steps: vec![step],
    })
}

/// Decide whether and how to bring the current branch up to date with main.
#[must_use]
pub fn decide_rebase(
    state: &RepositoryState,
    report: &DivergenceReport,
    settings: &Settings,
) -> Decision {
    if state.rebase_in_progress {
        return Decision::Run(SyncPlan {
            action: Action::ResumeRebase,
            steps: vec![Step::interactive(&["git", "rebase", "--continue"])],
        });
    }
    if state.is_dirty() {
        return Decision::Blocked(Blocker::DirtyWorkingTree {
            files: state.uncommitted_paths(),
        });
    }

    let up_to_date = Noop::UpToDate {
        branch: state.branch.clone(),
        main: settings.main_branch().to_owned(),
    };

    if settings.is_main(&state.branch) {
        if !state.behind_upstream && report.main_ahead_of_local.is_empty() {
            return Decision::Noop(up_to_date);
        }
        return Decision::Run(SyncPlan {
            action: Action::FastForwardMain,
            steps: vec![
                Step::captured(&["git", "fetch", settings.remote()]),
                Step::interactive(&["git", "rebase"]),
            ],
        });
    }

    // Main may be ahead of the pushed copy, the local copy, or both.
    if report.main_ahead_of_remote.is_empty() && report.main_ahead_of_local.is_empty() {
        return Decision::Noop(up_to_date);
    }
    let main_ref = settings.main_ref();
    Decision::Run(SyncPlan {
        action: Action::RebaseOntoMain,
        steps: vec![
            Step::captured(&["git", "fetch", settings.remote()]),
            Step::interactive(&["git", "rebase", &main_ref]),
        ],
    })
}

/// Decide whether the current branch can be released into main.
#[must_use]
pub fn decide_merge(state: &RepositoryState, settings: &Settings) -> Decision {
    if state.rebase_in_progress {
        return Decision::Blocked(Blocker::RebaseInProgress);
    }
    if state.is_dirty() {
        return Decision::Blocked(Blocker::DirtyWorkingTree {
            files: state.uncommitted_paths(),
        });
    }
    if settings.is_main(&state.branch) {
        return Decision::Blocked(Blocker::OnMainBranch {
            main: settings.main_branch().to_owned(),
        });
    }

    let branch = state.branch.as_str();
    Decision::Run(SyncPlan {
        action: Action::Release {
            branch: branch.to_owned(),
        },
        steps: vec![
            Step::captured(&["git", "checkout", settings.main_branch()]),
            Step::captured(&["git", "fetch", settings.remote()]),
            Step::captured(&["git", "pull"]),
            Step::captured(&["git", "merge", "--no-ff", "--no-edit", branch]),
            Step::captured(&["git", "push"]),
        ],
    })
}

/// Facts about the branch a `branch` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBranch {
    /// A local branch with that name exists.
    pub exists: bool,
    /// It has an upstream configured.
    pub tracked: bool,
}

/// Decide how to switch to (or create) `target`.
#[must_use]
pub fn decide_branch(
    current: &str,
    target: &BranchName,
    facts: TargetBranch,
    settings: &Settings,
) -> Decision {
    let name = target.as_str();
    if current == name {
        return Decision::Noop(Noop::AlreadyOn {
            branch: name.to_owned(),
        });
    }

    if facts.exists {
        let mut steps = vec![Step::captured(&["git", "switch", name])];
        if facts.tracked {
            steps.push(Step::captured(&["git", "pull", "--ff-only"]));
        }
        return Decision::Run(SyncPlan {
            action: Action::Switch {
                branch: name.to_owned(),
            },
            steps,
        });
    }

    if settings.is_main(name) {
        return Decision::Blocked(Blocker::CannotCreateMain {
            main: name.to_owned(),
        });
    }
    Decision::Run(SyncPlan {
        action: Action::Create {
            branch: name.to_owned(),
        },
        steps: vec![
            Step::captured(&["git", "branch", name]),
            Step::captured(&["git", "switch", name]),
        ],
    })
}

/// Gathers state, decides, and executes plans through an [`Executor`].
pub struct SyncEngine<'a, E: Executor> {
    executor: &'a E,
    settings: &'a Settings,
}

impl<'a, E: Executor> SyncEngine<'a, E> {
    pub const fn new(executor: &'a E, settings: &'a Settings) -> Self {
        Self { executor, settings }
    }

    /// Read the repository state, then its divergence report.
    ///
    /// # Errors
    /// Returns error if either read fails.
    pub fn analyze(&self) -> Result<(RepositoryState, DivergenceReport)> {
        let state = BranchState::new(self.executor, self.settings).read()?;
        let report = DivergenceAnalyzer::new(self.executor, self.settings).compute(&state)?;
        Ok((state, report))
    }

    /// Analyze and decide a push.
    ///
    /// # Errors
    /// Returns error if analysis fails.
    pub fn plan_push(&self) -> Result<Decision> {
        let (state, report) = self.analyze()?;
        Ok(decide_push(&state, &report, self.settings))
    }

    /// Analyze and decide a rebase.
    ///
    /// # Errors
    /// Returns error if analysis fails.
    pub fn plan_rebase(&self) -> Result<Decision> {
        let (state, report) = self.analyze()?;
        Ok(decide_rebase(&state, &report, self.settings))
    }

    /// Read state and decide a release merge.
    ///
    /// # Errors
    /// Returns error if the state can't be read.
    pub fn plan_merge(&self) -> Result<Decision> {
        let state = BranchState::new(self.executor, self.settings).read()?;
        Ok(decide_merge(&state, self.settings))
    }

    /// Decide a switch to `target`, fetching first.
    ///
    /// # Errors
    /// Returns error if the current branch can't be determined.
    pub fn plan_branch(&self, target: &BranchName) -> Result<Decision> {
        let branches = BranchState::new(self.executor, self.settings);
        let current = branches.current_branch()?;
        if current == target.as_str() {
            return Ok(Decision::Noop(Noop::AlreadyOn { branch: current }));
        }

        let exists = branches.local_branch_exists(target.as_str())?;
        let tracked = exists && branches.tracks_remote(target.as_str())?;
        if !exists {
            branches.fetch();
        }
        Ok(decide_branch(
            &current,
            target,
            TargetBranch { exists, tracked },
            self.settings,
        ))
    }

    /// Run every step of `plan`, calling `on_step` before each.
    ///
    /// # Errors
    /// The first failing step's error, verbatim; later steps don't run.
    pub fn execute(&self, plan: &SyncPlan, mut on_step: impl FnMut(&Step)) -> Result<()> {
        for step in &plan.steps {
            on_step(step);
            let argv: Vec<&str> = step.argv.iter().map(String::as_str).collect();
            match step.mode {
                RunMode::Captured => {
                    self.executor.run_checked(&argv)?;
                }
                RunMode::Interactive => self.executor.run_interactive(&argv)?,
            }
        }
        tracing::debug!(action = ?plan.action, steps = plan.steps.len(), "plan complete");
        Ok(())
    }
}
