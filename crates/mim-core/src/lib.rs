//! # mim-core
//!
//! Branch synchronization analysis for mim.
//!
//! [`BranchState`] reads the live repository into a [`RepositoryState`]
//! snapshot, [`DivergenceAnalyzer`] measures how the local branch, its
//! remote-tracking copy and the integration branch have drifted apart,
//! and [`sync`] decides whether push, rebase, merge or a branch switch is
//! safe and which commands carry it out.

pub mod branch;
pub mod branch_name;
pub mod config;
pub mod divergence;
pub mod error;
pub mod setup;
pub mod sync;

pub use branch::{BranchState, DirtyFile, RepositoryState};
pub use branch_name::BranchName;
pub use config::{Config, Settings};
pub use divergence::{Age, DivergenceAnalyzer, DivergenceMetric, DivergenceReport, Relation};
pub use error::{Error, Result};
pub use setup::{Setup, decide_init};
pub use sync::{Action, Blocker, Decision, Noop, Step, SyncEngine, SyncPlan, TargetBranch};
