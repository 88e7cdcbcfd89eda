//! `mim status` command - show how the branch has drifted.

use anyhow::Result;
use mim_core::{DivergenceReport, RepositoryState};
use serde::Serialize;

use crate::app::App;
use crate::output;
use crate::table::{StatusPresenter, StatusView};

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    main_branch: &'a str,
    remote: &'a str,
    state: &'a RepositoryState,
    divergence: &'a DivergenceReport,
}

/// Run the status command.
pub fn run(app: &App, json: bool) -> Result<()> {
    let state = app.branches().read()?;
    let report = app.analyzer().compute(&state)?;
    let settings = app.settings();

    if json {
        let out = JsonOutput {
            main_branch: settings.main_branch(),
            remote: settings.remote(),
            state: &state,
            divergence: &report,
        };
        output::essential(&serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let view = StatusView {
        state: &state,
        report: &report,
        settings,
    };
    let lines = StatusPresenter::default().render(&view);
    println!();
    for line in &lines {
        output::essential(&format!("  {line}"));
    }
    println!();
    output::detail(&format!(
        "  a>b: on a, not on b (files, age dd:hh:mm, last author); remote = {}, main = {}",
        settings.remote_ref(&state.branch),
        settings.main_ref()
    ));

    if state.rebase_in_progress {
        output::warn("Rebase in progress - resolve conflicts, then run `mim rebase` to continue");
    } else if state.behind_upstream {
        output::warn("Branch is behind its upstream - run `mim rebase`");
    }
    Ok(())
}
