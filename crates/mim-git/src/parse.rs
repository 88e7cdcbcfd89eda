//! Adapters from git's textual output to structured values.
//!
//! Each distinct output shape gets exactly one parser here. Code above
//! this layer works only with the returned types.

use chrono::{DateTime, TimeZone, Utc};

/// `git log` format string understood by [`parse_log`]: commit time
/// (unix seconds) and author name, tab separated.
pub const LOG_FORMAT: &str = "--format=%ct%x09%an";

/// One commit from a log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Committer timestamp.
    pub timestamp: DateTime<Utc>,
    /// Author name.
    pub author: String,
}

/// Parse `git log --format=%ct%x09%an` output, newest first as git emits it.
///
/// Lines that don't match the format are skipped.
#[must_use]
pub fn parse_log(lines: &[String]) -> Vec<LogEntry> {
    lines
        .iter()
        .filter_map(|line| {
            let (secs, author) = line.split_once('\t')?;
            let secs: i64 = secs.trim().parse().ok()?;
            let timestamp = Utc.timestamp_opt(secs, 0).single()?;
            Some(LogEntry {
                timestamp,
                author: author.trim().to_owned(),
            })
        })
        .collect()
}

/// Parse a `-z` file list (`diff --name-only -z`, `ls-files -z`).
///
/// Paths are NUL-terminated and never quoted, so non-ASCII names come
/// through as-is. A newline inside a path splits it across captured
/// lines; rejoining restores it. Each path appears once, in the order
/// the tool first reported it.
#[must_use]
pub fn parse_file_list(lines: &[String]) -> Vec<String> {
    let raw = lines.join("\n");
    let mut files: Vec<String> = Vec::new();
    for path in raw.split('\0').filter(|p| !p.is_empty()) {
        if !files.iter().any(|f| f == path) {
            files.push(path.to_owned());
        }
    }
    files
}

/// Parse a single `git config --get` value. Empty output means unset.
#[must_use]
pub fn parse_config_value(lines: &[String]) -> Option<String> {
    lines
        .first()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
}

/// Facts extracted from long-format `git status` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    /// A rebase (interactive or not) has been started and not finished.
    pub rebase_in_progress: bool,
    /// The branch being rebased, while HEAD is detached by the rebase.
    pub rebasing_branch: Option<String>,
    /// The branch is behind its upstream (or has diverged from it).
    pub behind_upstream: bool,
}

/// Parse long-format `git status` output.
#[must_use]
pub fn parse_status(lines: &[String]) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for line in lines {
        // matches both "interactive rebase in progress" and "rebase in progress"
        if line.contains("rebase in progress") {
            summary.rebase_in_progress = true;
        }
        if let Some((_, rest)) = line.split_once("rebasing branch '") {
            summary.rebasing_branch = rest.split_once('\'').map(|(name, _)| name.to_owned());
        }
        if line.contains("Your branch is behind") || line.contains("have diverged") {
            summary.behind_upstream = true;
        }
    }
    summary
}

/// Parse `git remote get-url --all` output into a list of URLs.
#[must_use]
pub fn parse_urls(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}
