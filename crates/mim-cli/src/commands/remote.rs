//! `mim remote <url>` - register the remote once.

use anyhow::Result;

use crate::app::App;
use crate::commands::utils;

/// Run the remote command.
pub fn run(app: &App, url: &str) -> Result<()> {
    let decision = app.setup().plan_remote(url)?;
    utils::apply(app, decision)
}
