//! Error types for mim-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to git.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// One side of a commit range does not exist (e.g. branch never pushed).
    #[error("cannot compare {base} with {head}: `{missing}` does not exist")]
    RangeUnavailable {
        /// Base reference of the range.
        base: String,
        /// Head reference of the range.
        head: String,
        /// The endpoint that failed to resolve.
        missing: String,
    },

    /// An external command exited with a non-zero status.
    #[error("`{command}` failed with exit code {code}{}", output_suffix(.output))]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Exit code reported by the process (1 when killed by a signal).
        code: i32,
        /// Captured stdout followed by stderr, verbatim.
        output: Vec<String>,
    },

    /// The command could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The command line that could not be spawned.
        command: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

impl Error {
    /// Exit code of the failed external command, if this is a command failure.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn output_suffix(output: &[String]) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{}", output.join("\n"))
    }
}
