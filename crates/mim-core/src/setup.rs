//! Repository setup verbs: staging new files and registering the remote.

use mim_git::{Executor, RunMode, parse};

use crate::branch::BranchState;
use crate::config::Settings;
use crate::error::Result;
use crate::sync::{Action, Blocker, Decision, Noop, Step, SyncPlan};

/// Decide how to stage `untracked` files.
#[must_use]
pub fn decide_add(untracked: &[String]) -> Decision {
    if untracked.is_empty() {
        return Decision::Noop(Noop::NothingToAdd);
    }
    let mut argv = vec!["git", "add", "--"];
    argv.extend(untracked.iter().map(String::as_str));
    Decision::Run(SyncPlan {
        action: Action::Stage {
            files: untracked.len(),
        },
        steps: vec![Step::captured(&argv)],
    })
}

/// Decide how to point the configured remote at `url`, given the URLs it
/// already has.
#[must_use]
pub fn decide_remote(existing: &[String], url: &str, settings: &Settings) -> Decision {
    let remote = settings.remote();
    match existing {
        [] => Decision::Run(SyncPlan {
            action: Action::AddRemote {
                remote: remote.to_owned(),
                url: url.to_owned(),
            },
            steps: vec![Step::captured(&["git", "remote", "add", remote, url])],
        }),
        urls if urls.iter().any(|u| u == url) => Decision::Noop(Noop::RemoteSet {
            remote: remote.to_owned(),
            url: url.to_owned(),
        }),
        [first, ..] => Decision::Blocked(Blocker::RemoteMismatch {
            remote: remote.to_owned(),
            existing: first.clone(),
        }),
    }
}

/// Decide how to turn the current directory into a published repository.
///
/// The plan initialises the repository on the main branch, stages every
/// non-ignored file, records an initial commit, registers the remote and
/// pushes main with its upstream set.
#[must_use]
pub fn decide_init(inside_repository: bool, url: &str, settings: &Settings) -> Decision {
    if inside_repository {
        return Decision::Blocked(Blocker::AlreadyRepository);
    }
    let remote = settings.remote();
    let main = settings.main_branch();

    let mut steps = vec![
        Step::captured(&["git", "init", "--initial-branch", main]),
        Step::captured(&["git", "add", "--all"]),
        Step::captured(&["git", "commit", "--allow-empty", "-m", "Initial commit"]),
    ];
    // A fresh repository has no remotes yet.
    if let Decision::Run(plan) = decide_remote(&[], url, settings) {
        steps.extend(plan.steps);
    }
    steps.push(Step::captured(&["git", "push", "-u", remote, main]));

    Decision::Run(SyncPlan {
        action: Action::Init {
            remote: remote.to_owned(),
            url: url.to_owned(),
        },
        steps,
    })
}

/// Gathers the facts the setup verbs decide on.
pub struct Setup<'a, E: Executor> {
    executor: &'a E,
    settings: &'a Settings,
}

impl<'a, E: Executor> Setup<'a, E> {
    pub const fn new(executor: &'a E, settings: &'a Settings) -> Self {
        Self { executor, settings }
    }

    /// URLs configured for the remote; empty when it doesn't exist.
    ///
    /// # Errors
    /// Returns error if git could not be run.
    pub fn remote_urls(&self) -> Result<Vec<String>> {
        let output = self.executor.run(
            &["git", "remote", "get-url", "--all", self.settings.remote()],
            RunMode::Captured,
        )?;
        if !output.success() {
            return Ok(Vec::new());
        }
        Ok(parse::parse_urls(&output.stdout))
    }

    /// Decide how to stage the working tree's untracked files.
    ///
    /// # Errors
    /// Returns error if the untracked list can't be read.
    pub fn plan_add(&self) -> Result<Decision> {
        let untracked = BranchState::new(self.executor, self.settings).untracked()?;
        Ok(decide_add(&untracked))
    }

    /// Decide how to register `url` as the remote.
    ///
    /// # Errors
    /// Returns error if the existing URLs can't be read.
    pub fn plan_remote(&self, url: &str) -> Result<Decision> {
        let existing = self.remote_urls()?;
        Ok(decide_remote(&existing, url, self.settings))
    }
}
