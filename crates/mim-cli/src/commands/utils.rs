use anyhow::Result;
use mim_core::{Action, Decision, Settings, SyncPlan};

use crate::app::App;
use crate::output;

/// Act on a decision: report a blocker or no-op, or run the plan.
///
/// A blocked decision is reported and returns `Ok`: nothing was run, and
/// nothing failed.
pub fn apply(app: &App, decision: Decision) -> Result<()> {
    match decision {
        Decision::Blocked(blocker) => {
            output::warn(&blocker.to_string());
            Ok(())
        }
        Decision::Noop(noop) => {
            output::info(&noop.to_string());
            Ok(())
        }
        Decision::Run(plan) => execute(app, &plan),
    }
}

/// Run `plan`, echoing each command, then report what it achieved.
pub fn execute(app: &App, plan: &SyncPlan) -> Result<()> {
    app.engine()
        .execute(plan, |step| output::command(&step.to_string()))?;
    output::success(&summary(&plan.action, app.settings()));
    Ok(())
}

fn summary(action: &Action, settings: &Settings) -> String {
    match action {
        Action::ResumeRebase => "Rebase continued".to_owned(),
        Action::Push { set_upstream: true } => {
            format!("Pushed and set upstream on {}", settings.remote())
        }
        Action::Push { set_upstream: false } => "Pushed".to_owned(),
        Action::FastForwardMain => format!("{} is up to date", settings.main_branch()),
        Action::RebaseOntoMain => format!("Rebased onto {}", settings.main_ref()),
        Action::Release { branch } => {
            format!("Released {branch} into {}", settings.main_branch())
        }
        Action::Switch { branch } => format!("Switched to {branch}"),
        Action::Create { branch } => format!("Created and switched to {branch}"),
        Action::Stage { files } => format!("Staged {files} file(s)"),
        Action::AddRemote { remote, url } => format!("Added remote {remote} → {url}"),
        Action::Init { remote, url } => format!(
            "Initialized repository and pushed {} to {remote} ({url})",
            settings.main_branch()
        ),
    }
}
