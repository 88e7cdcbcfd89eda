//! `mim branch <name>` - switch to a branch, creating it when missing.

use anyhow::Result;
use mim_core::BranchName;

use crate::app::App;
use crate::commands::utils;

/// Run the branch command.
pub fn run(app: &App, name: &str) -> Result<()> {
    let target = BranchName::new(name)?;
    let decision = app.engine().plan_branch(&target)?;
    utils::apply(app, decision)
}
