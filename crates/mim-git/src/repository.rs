//! Repository discovery.
//!
//! mim never edits the repository through libgit2; it only uses it to
//! locate the work tree and git directory, then hands a
//! [`SystemExecutor`] rooted at the work tree to the rest of the program.

use std::path::Path;

use crate::error::{Error, Result};
use crate::executor::SystemExecutor;

/// A discovered, non-bare git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open the repository containing `path` (or any parent).
    ///
    /// # Errors
    /// Returns `NotARepository` if no repository is found, or if it is bare.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NotARepository
            } else {
                Error::Git2(e)
            }
        })?;
        if inner.is_bare() {
            return Err(Error::NotARepository);
        }
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Root of the work tree.
    ///
    /// # Errors
    /// Returns `NotARepository` for a bare repository.
    pub fn workdir(&self) -> Result<&Path> {
        self.inner.workdir().ok_or(Error::NotARepository)
    }

    /// Path to the `.git` directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// An executor that runs commands at the work-tree root.
    ///
    /// # Errors
    /// Returns `NotARepository` for a bare repository.
    pub fn executor(&self) -> Result<SystemExecutor> {
        Ok(SystemExecutor::new(self.workdir()?))
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.git_dir())
            .finish()
    }
}
