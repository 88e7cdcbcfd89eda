//! The coordinator: one place that owns the repository, the executor and
//! the resolved settings, and hands each verb the component it needs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mim_core::config::{CONFIG_FILE, Overrides};
use mim_core::{BranchState, Config, DivergenceAnalyzer, Settings, Setup, SyncEngine};
use mim_git::{Repository, SystemExecutor};

pub struct App {
    executor: SystemExecutor,
    settings: Settings,
}

impl App {
    /// Discover the repository around the current directory and resolve
    /// settings from its `mim.toml` plus `overrides`.
    pub fn open(overrides: Overrides) -> Result<Self> {
        let repo = Repository::open_current().context("Not inside a git repository")?;
        let config_path = repo.git_dir().join(CONFIG_FILE);
        let config = Config::load(&config_path)?;
        let settings = Settings::resolve(&config, overrides);
        tracing::debug!(?settings, config = %config_path.display(), "settings resolved");

        let executor = repo.executor().context("Cannot run in bare repository")?;
        Ok(Self { executor, settings })
    }

    /// Work in `dir`, which need not be a repository yet. Settings come
    /// from the defaults plus `overrides`.
    pub fn bootstrap(dir: PathBuf, overrides: Overrides) -> Self {
        let settings = Settings::resolve(&Config::default(), overrides);
        Self {
            executor: SystemExecutor::new(dir),
            settings,
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn branches(&self) -> BranchState<'_, SystemExecutor> {
        BranchState::new(&self.executor, &self.settings)
    }

    pub const fn analyzer(&self) -> DivergenceAnalyzer<'_, SystemExecutor> {
        DivergenceAnalyzer::new(&self.executor, &self.settings)
    }

    pub const fn engine(&self) -> SyncEngine<'_, SystemExecutor> {
        SyncEngine::new(&self.executor, &self.settings)
    }

    pub const fn setup(&self) -> Setup<'_, SystemExecutor> {
        Setup::new(&self.executor, &self.settings)
    }
}
