//! # mim-git
//!
//! Subprocess layer for mim. Every git interaction goes through an
//! [`Executor`]; tool output is turned into structured values by the
//! narrow parsers in [`parse`], and commit ranges are queried with the
//! correct two-dot/three-dot notation by [`RangeQuery`].

mod error;
mod executor;
pub mod parse;
mod range;
mod repository;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use error::{Error, Result};
pub use executor::{CommandOutput, Executor, RunMode, SystemExecutor};
pub use parse::{LogEntry, StatusSummary};
pub use range::{CommitRange, RangeMode, RangeQuery, VerifiedRange};
pub use repository::Repository;
