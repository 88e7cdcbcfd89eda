//! Divergence between a branch, its remote-tracking copy, and main.
//!
//! For the checked-out branch `B` on remote `origin` with integration
//! branch `main`, the report measures all six directed relationships
//! among `B`, `origin/B` and `origin/main`. Every measurement is a
//! [`CommitRange`](mim_git::CommitRange) pair read as "what `head` has
//! that `base` lacks", queried once as a three-dot file list and once as
//! a two-dot log.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use mim_git::{Executor, RangeQuery};
use serde::{Serialize, Serializer};

use crate::branch::RepositoryState;
use crate::config::Settings;
use crate::error::Result;

/// Elapsed wall-clock time, displayed as `dd:hh:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Age(TimeDelta);

impl Age {
    /// Time from `then` to `now`; clock skew into the future counts as zero.
    #[must_use]
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self((now - then).max(TimeDelta::zero()))
    }

    #[must_use]
    pub const fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0.num_minutes();
        write!(
            f,
            "{:02}:{:02}:{:02}",
            minutes / (24 * 60),
            (minutes / 60) % 24,
            minutes % 60
        )
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summary of one directed range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DivergenceMetric {
    /// Both references existed when the range was queried.
    pub available: bool,
    /// Files changed on the head side since the merge base.
    pub files: Vec<String>,
    /// Commits on the head side the base side lacks.
    pub commits: usize,
    /// Time since the newest of those commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
    /// Author of the newest of those commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_author: Option<String>,
}

impl DivergenceMetric {
    /// Metric for a range whose endpoint doesn't exist: zero divergence.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// No files and no commits on the head side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.commits == 0
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// The six directed relationships, named "`head` ahead of `base`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Local commits not yet pushed.
    LocalAheadOfRemote,
    /// Commits pushed from elsewhere, not yet pulled.
    RemoteAheadOfLocal,
    /// Local work main doesn't have.
    LocalAheadOfMain,
    /// Main work the local branch doesn't have.
    MainAheadOfLocal,
    /// Branch work not yet released to main.
    RemoteAheadOfMain,
    /// Work landed on main since the branch's remote copy diverged.
    MainAheadOfRemote,
}

impl Relation {
    pub const ALL: [Self; 6] = [
        Self::LocalAheadOfRemote,
        Self::RemoteAheadOfLocal,
        Self::LocalAheadOfMain,
        Self::MainAheadOfLocal,
        Self::RemoteAheadOfMain,
        Self::MainAheadOfRemote,
    ];

    /// `(base, head)` references for `branch`.
    #[must_use]
    pub fn endpoints(self, branch: &str, settings: &Settings) -> (String, String) {
        let local = branch.to_owned();
        let remote = settings.remote_ref(branch);
        let main = settings.main_ref();
        match self {
            Self::LocalAheadOfRemote => (remote, local),
            Self::RemoteAheadOfLocal => (local, remote),
            Self::LocalAheadOfMain => (main, local),
            Self::MainAheadOfLocal => (local, main),
            Self::RemoteAheadOfMain => (main, remote),
            Self::MainAheadOfRemote => (remote, main),
        }
    }
}

/// Uncommitted and untracked work in the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingTree {
    pub uncommitted: Vec<String>,
    /// Time since the oldest uncommitted file was modified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncommitted_age: Option<Age>,
    pub untracked: usize,
}

/// Divergence of one branch triple, computed fresh for each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivergenceReport {
    pub branch: String,
    pub local_ahead_of_remote: DivergenceMetric,
    pub remote_ahead_of_local: DivergenceMetric,
    pub local_ahead_of_main: DivergenceMetric,
    pub main_ahead_of_local: DivergenceMetric,
    pub remote_ahead_of_main: DivergenceMetric,
    pub main_ahead_of_remote: DivergenceMetric,
    pub working_tree: WorkingTree,
}

impl DivergenceReport {
    /// A report with every metric empty.
    #[must_use]
    pub fn empty(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            local_ahead_of_remote: DivergenceMetric::default(),
            remote_ahead_of_local: DivergenceMetric::default(),
            local_ahead_of_main: DivergenceMetric::default(),
            main_ahead_of_local: DivergenceMetric::default(),
            remote_ahead_of_main: DivergenceMetric::default(),
            main_ahead_of_remote: DivergenceMetric::default(),
            working_tree: WorkingTree::default(),
        }
    }

    #[must_use]
    pub const fn metric(&self, relation: Relation) -> &DivergenceMetric {
        match relation {
            Relation::LocalAheadOfRemote => &self.local_ahead_of_remote,
            Relation::RemoteAheadOfLocal => &self.remote_ahead_of_local,
            Relation::LocalAheadOfMain => &self.local_ahead_of_main,
            Relation::MainAheadOfLocal => &self.main_ahead_of_local,
            Relation::RemoteAheadOfMain => &self.remote_ahead_of_main,
            Relation::MainAheadOfRemote => &self.main_ahead_of_remote,
        }
    }

    const fn metric_mut(&mut self, relation: Relation) -> &mut DivergenceMetric {
        match relation {
            Relation::LocalAheadOfRemote => &mut self.local_ahead_of_remote,
            Relation::RemoteAheadOfLocal => &mut self.remote_ahead_of_local,
            Relation::LocalAheadOfMain => &mut self.local_ahead_of_main,
            Relation::MainAheadOfLocal => &mut self.main_ahead_of_local,
            Relation::RemoteAheadOfMain => &mut self.remote_ahead_of_main,
            Relation::MainAheadOfRemote => &mut self.main_ahead_of_remote,
        }
    }
}

/// Computes [`DivergenceReport`]s.
pub struct DivergenceAnalyzer<'a, E: Executor> {
    executor: &'a E,
    settings: &'a Settings,
}

impl<'a, E: Executor> DivergenceAnalyzer<'a, E> {
    pub const fn new(executor: &'a E, settings: &'a Settings) -> Self {
        Self { executor, settings }
    }

    /// Compute the report for the branch in `state`, aged against now.
    ///
    /// # Errors
    /// Returns error if a range query fails for a reason other than a
    /// missing reference.
    pub fn compute(&self, state: &RepositoryState) -> Result<DivergenceReport> {
        self.compute_at(state, Utc::now())
    }

    /// Compute the report with an explicit clock.
    ///
    /// # Errors
    /// See [`DivergenceAnalyzer::compute`].
    pub fn compute_at(
        &self,
        state: &RepositoryState,
        now: DateTime<Utc>,
    ) -> Result<DivergenceReport> {
        let mut report = DivergenceReport::empty(&state.branch);
        for relation in Relation::ALL {
            let (base, head) = relation.endpoints(&state.branch, self.settings);
            *report.metric_mut(relation) = self.measure(&base, &head, now)?;
        }

        report.working_tree = WorkingTree {
            uncommitted: state.uncommitted_paths(),
            uncommitted_age: state
                .uncommitted
                .iter()
                .filter_map(|f| f.modified)
                .min()
                .map(|oldest| Age::between(oldest, now)),
            untracked: state.untracked.len(),
        };

        Ok(report)
    }

    /// Measure one directed range. A missing endpoint is zero divergence.
    ///
    /// # Errors
    /// Returns error if a query fails for any other reason.
    pub fn measure(&self, base: &str, head: &str, now: DateTime<Utc>) -> Result<DivergenceMetric> {
        let range = match RangeQuery::new(self.executor).verify(base, head) {
            Ok(range) => range,
            Err(mim_git::Error::RangeUnavailable { .. }) => {
                tracing::debug!(base, head, "treating missing reference as no divergence");
                return Ok(DivergenceMetric::unavailable());
            }
            Err(e) => return Err(e.into()),
        };
        let files = range.files()?;
        let log = range.log()?;
        let newest = log.first();

        Ok(DivergenceMetric {
            available: true,
            files,
            commits: log.len(),
            age: newest.map(|c| Age::between(c.timestamp, now)),
            last_author: newest.map(|c| c.author.clone()),
        })
    }
}
