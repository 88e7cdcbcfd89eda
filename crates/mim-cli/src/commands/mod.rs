//! Command-line surface: argument definitions and one module per verb.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use mim_core::config::Overrides;

pub mod add;
pub mod branch;
pub mod completions;
pub mod init;
pub mod merge;
pub mod push;
pub mod rebase;
pub mod remote;
pub mod status;
pub mod utils;

/// mim - keep a working branch in step with its remote and main.
#[derive(Debug, Parser)]
#[command(name = "mim", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every verb.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log every git command run (same as MIM_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors, warnings and essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Remote to compare against, push to and fetch from
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    /// Integration branch
    #[arg(long = "main", global = true, value_name = "BRANCH")]
    pub main_branch: Option<String>,

    /// Don't fetch before analysing
    #[arg(long, global = true)]
    pub no_fetch: bool,
}

impl GlobalArgs {
    /// Overrides to compose with the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            remote: self.remote.clone(),
            main_branch: self.main_branch.clone(),
            no_fetch: self.no_fetch,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how the branch, its remote copy and main have diverged
    #[command(visible_alias = "st")]
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Push the current branch, creating its upstream when needed
    Push,

    /// Bring the current branch up to date with main
    Rebase,

    /// Merge the current branch into main and push it
    #[command(visible_alias = "release")]
    Merge {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Switch to a branch, creating it if it doesn't exist
    Branch {
        /// Branch name
        name: String,
    },

    /// Stage every untracked, non-ignored file
    Add,

    /// Register the remote's URL
    Remote {
        /// Repository URL
        url: String,
    },

    /// Turn the current directory into a repository and publish it
    Init {
        /// Repository URL
        url: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn release_is_merge() {
        let cli = Cli::try_parse_from(["mim", "release", "--yes"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Merge { yes: true }));
    }

    #[test]
    fn global_overrides_after_verb() {
        let cli = Cli::try_parse_from(["mim", "status", "--remote", "upstream", "--main", "trunk", "--no-fetch"])
            .unwrap_or_else(|e| panic!("{e}"));
        let overrides = cli.global.overrides();
        assert_eq!(overrides.remote.as_deref(), Some("upstream"));
        assert_eq!(overrides.main_branch.as_deref(), Some("trunk"));
        assert!(overrides.no_fetch);
    }

    #[test]
    fn init_takes_a_url() {
        let cli = Cli::try_parse_from(["mim", "init", "git@example.com:app.git", "--main", "trunk"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(&cli.command, Commands::Init { url } if url == "git@example.com:app.git"));
        assert_eq!(cli.global.overrides().main_branch.as_deref(), Some("trunk"));
    }
}
