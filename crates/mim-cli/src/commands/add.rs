use anyhow::Result;

use crate::app::App;
use crate::commands::utils;

/// Stage untracked files.
pub fn run(app: &App) -> Result<()> {
    let decision = app.setup().plan_add()?;
    utils::apply(app, decision)
}
