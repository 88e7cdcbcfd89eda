//! `mim push` - publish the current branch.

use anyhow::Result;

use crate::app::App;
use crate::commands::utils;

/// Run the push command.
pub fn run(app: &App) -> Result<()> {
    let decision = app.engine().plan_push()?;
    utils::apply(app, decision)
}
