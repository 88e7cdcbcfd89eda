//! `mim init <url>` - create a repository here and publish it.

use anyhow::{Context, Result};
use mim_core::config::Overrides;
use mim_core::decide_init;
use mim_git::Repository;

use crate::app::App;
use crate::commands::utils;

/// Run the init command.
pub fn run(url: &str, overrides: Overrides) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot read the current directory")?;
    let inside_repository = match Repository::open(&cwd) {
        Ok(_) => true,
        Err(mim_git::Error::NotARepository) => false,
        Err(e) => return Err(e.into()),
    };

    let app = App::bootstrap(cwd, overrides);
    let decision = decide_init(inside_repository, url, app.settings());
    utils::apply(&app, decision)
}
