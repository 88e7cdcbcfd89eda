//! Configuration for mim.
//!
//! [`Config`] is what `.git/mim.toml` contains; [`Settings`] is the
//! immutable value every component receives, built once at startup from
//! the file plus command-line overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the config inside the git directory.
pub const CONFIG_FILE: &str = "mim.toml";

/// mim configuration loaded from `.git/mim.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Git settings.
    #[serde(default)]
    pub git: GitConfig,
}

impl Config {
    /// Load config from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            file: path.to_path_buf(),
            message: e.message().to_owned(),
        })
    }
}

/// Git-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote holding the tracking branches and the integration branch.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Name of the integration branch.
    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    /// Whether analysis fetches from the remote first.
    #[serde(default = "default_fetch")]
    pub fetch: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            main_branch: default_main_branch(),
            fetch: default_fetch(),
        }
    }
}

fn default_remote() -> String {
    "origin".into()
}

fn default_main_branch() -> String {
    "main".into()
}

const fn default_fetch() -> bool {
    true
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub remote: Option<String>,
    pub main_branch: Option<String>,
    pub no_fetch: bool,
}

/// Resolved, read-only settings shared by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    remote: String,
    main_branch: String,
    fetch: bool,
}

impl Settings {
    /// Compose the config file with command-line overrides.
    #[must_use]
    pub fn resolve(config: &Config, overrides: Overrides) -> Self {
        Self {
            remote: overrides.remote.unwrap_or_else(|| config.git.remote.clone()),
            main_branch: overrides
                .main_branch
                .unwrap_or_else(|| config.git.main_branch.clone()),
            fetch: config.git.fetch && !overrides.no_fetch,
        }
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn main_branch(&self) -> &str {
        &self.main_branch
    }

    #[must_use]
    pub const fn fetch(&self) -> bool {
        self.fetch
    }

    /// Remote-tracking ref for `branch`, e.g. `origin/feature`.
    #[must_use]
    pub fn remote_ref(&self, branch: &str) -> String {
        format!("{}/{branch}", self.remote)
    }

    /// Remote-tracking ref of the integration branch, e.g. `origin/main`.
    #[must_use]
    pub fn main_ref(&self) -> String {
        self.remote_ref(&self.main_branch)
    }

    /// Whether `branch` is the integration branch.
    #[must_use]
    pub fn is_main(&self, branch: &str) -> bool {
        branch == self.main_branch
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&Config::default(), Overrides::default())
    }
}
