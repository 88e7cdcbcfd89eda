//! `mim completions` - print a shell completion script.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use super::Cli;

/// Print completions for `shell` to stdout.
#[allow(clippy::unnecessary_wraps)]
pub fn run(shell: Shell) -> anyhow::Result<()> {
    write_to(shell, &mut io::stdout());
    Ok(())
}

fn write_to(shell: Shell, out: &mut impl Write) {
    generate(shell, &mut Cli::command(), "mim", out);
}
