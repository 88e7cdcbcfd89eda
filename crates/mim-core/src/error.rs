//! Error types for mim-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mim-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Config file could not be parsed.
    #[error("failed to parse {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error.
    #[error(transparent)]
    Git(#[from] mim_git::Error),
}

impl Error {
    /// Exit code of a failed external command anywhere underneath this error.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Git(e) => e.exit_code(),
            _ => None,
        }
    }

    /// Whether this is a detached-HEAD failure.
    #[must_use]
    pub const fn is_detached_head(&self) -> bool {
        matches!(self, Self::Git(mim_git::Error::DetachedHead))
    }
}
