//! `mim rebase` - bring the current branch up to date with main, or
//! resume a rebase that stopped on a conflict.

use anyhow::Result;

use crate::app::App;
use crate::commands::utils;

/// Run the rebase command.
pub fn run(app: &App) -> Result<()> {
    let decision = app.engine().plan_rebase()?;
    utils::apply(app, decision)
}
