//! mim CLI - keep a working branch in step with its remote and main.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod app;
mod commands;
mod output;
mod table;

use app::App;
use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    output::set_quiet(cli.global.quiet);

    if let Err(e) = run(cli) {
        std::process::exit(report(&e));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MIM_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Completions { shell } => return commands::completions::run(*shell),
        Commands::Init { url } => return commands::init::run(url, cli.global.overrides()),
        _ => {}
    }

    let app = App::open(cli.global.overrides())?;
    match cli.command {
        Commands::Status { json } => commands::status::run(&app, json),
        Commands::Push => commands::push::run(&app),
        Commands::Rebase => commands::rebase::run(&app),
        Commands::Merge { yes } => commands::merge::run(&app, yes),
        Commands::Branch { name } => commands::branch::run(&app, &name),
        Commands::Add => commands::add::run(&app),
        Commands::Remote { url } => commands::remote::run(&app, &url),
        Commands::Completions { .. } | Commands::Init { .. } => Ok(()),
    }
}

/// Print `e` and pick the process exit code: a failed git command's own
/// code, otherwise 1.
fn report(e: &anyhow::Error) -> i32 {
    if e.chain().any(is_detached_head) {
        output::error_detached_head();
        return 1;
    }
    output::error(&format!("{e:#}"));
    e.chain().find_map(command_exit_code).unwrap_or(1)
}

fn is_detached_head(cause: &(dyn std::error::Error + 'static)) -> bool {
    cause
        .downcast_ref::<mim_core::Error>()
        .is_some_and(mim_core::Error::is_detached_head)
        || matches!(
            cause.downcast_ref::<mim_git::Error>(),
            Some(mim_git::Error::DetachedHead)
        )
}

fn command_exit_code(cause: &(dyn std::error::Error + 'static)) -> Option<i32> {
    cause
        .downcast_ref::<mim_core::Error>()
        .and_then(mim_core::Error::exit_code)
        .or_else(|| {
            cause
                .downcast_ref::<mim_git::Error>()
                .and_then(mim_git::Error::exit_code)
        })
}
