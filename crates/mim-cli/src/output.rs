//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print the detached HEAD error message with guidance (always to stderr).
pub fn error_detached_head() {
    error("Cannot run this command in detached HEAD state.");
    eprintln!();
    eprintln!("You are not on any branch. To fix this:");
    eprintln!("  1. Switch to an existing branch: mim branch <branch-name>");
    eprintln!("  2. Or keep this commit on a new one: git switch -c <branch-name>");
    eprintln!();
    eprintln!("Run `mim status` after switching to a branch.");
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Echo a git command about to run (suppressed in quiet mode).
pub fn command(argv: &str) {
    if !is_quiet() {
        println!("{} {}", "$".dimmed(), argv.dimmed());
    }
}

/// Colored branch name; main is highlighted as a caution.
#[must_use]
pub fn branch_name(name: &str, is_main: bool) -> String {
    if is_main {
        name.yellow().bold().to_string()
    } else {
        name.cyan().bold().to_string()
    }
}
