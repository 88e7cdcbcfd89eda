//! `mim merge` (alias `release`) - merge the current branch into main.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use inquire::Confirm;
use mim_core::{Action, Decision, SyncPlan};

use crate::app::App;
use crate::commands::utils;
use crate::output;

/// Run the merge command.
pub fn run(app: &App, yes: bool) -> Result<()> {
    let decision = app.engine().plan_merge()?;
    let Decision::Run(plan) = decision else {
        return utils::apply(app, decision);
    };

    if !yes && io::stdin().is_terminal() && !confirm_release(&plan)? {
        return Ok(());
    }
    utils::execute(app, &plan)
}

/// Show the plan and ask before touching main.
fn confirm_release(plan: &SyncPlan) -> Result<bool> {
    if let Action::Release { branch } = &plan.action {
        output::info(&format!("Will release {branch}:"));
    }
    for step in &plan.steps {
        output::detail(&format!("  {step}"));
    }

    let confirmed = Confirm::new("Proceed with release?")
        .with_default(false)
        .prompt()
        .context("Confirmation cancelled")?;

    if !confirmed {
        output::info("Release cancelled");
    }
    Ok(confirmed)
}
