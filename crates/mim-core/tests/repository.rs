//! Analysis against real repositories built with the `git` binary.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use mim_core::{BranchState, Decision, DivergenceAnalyzer, Settings, Setup, SyncEngine};
use mim_git::{RangeQuery, SystemExecutor};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_EDITOR", "true")
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Run git where failure is the expected outcome.
fn git_unchecked(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_EDITOR", "true")
        .output()
        .expect("failed to run git")
        .status
        .success()
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", &format!("update {name}")]);
}

/// A bare `origin` and a clone of it with one pushed commit on `main`.
struct Fixture {
    _root: TempDir,
    work: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let remote = root.path().join("remote.git");
        let work = root.path().join("work");
        fs::create_dir_all(&remote).unwrap();
        fs::create_dir_all(&work).unwrap();

        git(&remote, &["init", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git(&work, &["init"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "core.editor", "true"]);
        commit_file(&work, "README.md", "# Test Repo\n");
        git(&work, &["branch", "-M", "main"]);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&work, &["push", "-u", "origin", "main"]);

        Self { _root: root, work }
    }

    fn executor(&self) -> SystemExecutor {
        SystemExecutor::new(&self.work)
    }
}

fn set(files: &[String]) -> HashSet<&str> {
    files.iter().map(String::as_str).collect()
}

#[test]
fn main_ahead_of_remote_lists_files_landed_on_main() {
    let fx = Fixture::new();
    git(&fx.work, &["switch", "-c", "feature"]);
    commit_file(&fx.work, "feature.txt", "feature\n");
    git(&fx.work, &["push", "-u", "origin", "feature"]);

    git(&fx.work, &["switch", "main"]);
    for name in ["a.txt", "b.txt", "c.txt"] {
        commit_file(&fx.work, name, name);
    }
    git(&fx.work, &["push"]);
    git(&fx.work, &["switch", "feature"]);

    let exec = fx.executor();
    let settings = Settings::default();
    let state = BranchState::new(&exec, &settings).read().unwrap();
    let report = DivergenceAnalyzer::new(&exec, &settings).compute(&state).unwrap();

    assert_eq!(state.branch, "feature");
    assert!(state.tracked);
    assert_eq!(
        set(&report.main_ahead_of_remote.files),
        HashSet::from(["a.txt", "b.txt", "c.txt"])
    );
    assert_eq!(report.main_ahead_of_remote.commits, 3);
    assert_eq!(report.main_ahead_of_remote.last_author.as_deref(), Some("Test User"));
    assert_eq!(set(&report.remote_ahead_of_main.files), HashSet::from(["feature.txt"]));
    assert!(report.local_ahead_of_remote.is_empty());
    assert!(report.remote_ahead_of_local.is_empty());
}

#[test]
fn unpushed_branch_reports_zero_divergence() {
    let fx = Fixture::new();
    git(&fx.work, &["switch", "-c", "local-only"]);
    commit_file(&fx.work, "draft.txt", "draft\n");

    let exec = fx.executor();
    let settings = Settings::default();
    let state = BranchState::new(&exec, &settings).read().unwrap();
    let report = DivergenceAnalyzer::new(&exec, &settings).compute(&state).unwrap();

    assert!(!state.tracked);
    assert_eq!(report.local_ahead_of_remote.file_count(), 0);
    assert_eq!(report.remote_ahead_of_local.file_count(), 0);
    assert!(!report.local_ahead_of_remote.available);
    assert_eq!(set(&report.local_ahead_of_main.files), HashSet::from(["draft.txt"]));
}

#[test]
fn log_ranges_are_asymmetric() {
    let fx = Fixture::new();
    git(&fx.work, &["switch", "-c", "feature"]);
    commit_file(&fx.work, "feature.txt", "feature\n");
    git(&fx.work, &["switch", "main"]);
    commit_file(&fx.work, "main.txt", "main\n");
    commit_file(&fx.work, "main2.txt", "main\n");

    let exec = fx.executor();
    let query = RangeQuery::new(&exec);
    let forward = query.log("main", "feature").unwrap();
    let backward = query.log("feature", "main").unwrap();

    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 2);
    assert_eq!(query.files("main", "feature").unwrap(), vec!["feature.txt"]);
    assert_eq!(
        set(&query.files("feature", "main").unwrap()),
        HashSet::from(["main.txt", "main2.txt"])
    );

    // Same commit on both sides: nothing either way.
    assert!(query.log("main", "main").unwrap().is_empty());
}

fn start_conflicting_rebase(fx: &Fixture) {
    commit_file(&fx.work, "shared.txt", "base\n");
    git(&fx.work, &["switch", "-c", "feature"]);
    commit_file(&fx.work, "shared.txt", "feature\n");
    git(&fx.work, &["switch", "main"]);
    commit_file(&fx.work, "shared.txt", "main\n");
    git(&fx.work, &["switch", "feature"]);
    assert!(!git_unchecked(&fx.work, &["rebase", "main"]));
}

#[test]
fn rebase_in_progress_until_aborted() {
    let fx = Fixture::new();
    let exec = fx.executor();
    let settings = Settings::default();
    let branches = BranchState::new(&exec, &settings);
    assert!(!branches.rebase_in_progress().unwrap());

    start_conflicting_rebase(&fx);
    assert!(branches.rebase_in_progress().unwrap());

    // HEAD is detached, yet the snapshot still names the branch.
    let state = branches.read().unwrap();
    assert_eq!(state.branch, "feature");
    assert!(state.rebase_in_progress);

    git(&fx.work, &["rebase", "--abort"]);
    assert!(!branches.rebase_in_progress().unwrap());
}

#[test]
fn rebase_in_progress_until_continued() {
    let fx = Fixture::new();
    let exec = fx.executor();
    let settings = Settings::default();
    let branches = BranchState::new(&exec, &settings);

    start_conflicting_rebase(&fx);
    assert!(branches.rebase_in_progress().unwrap());

    fs::write(fx.work.join("shared.txt"), "resolved\n").unwrap();
    git(&fx.work, &["add", "shared.txt"]);
    git(&fx.work, &["rebase", "--continue"]);
    assert!(!branches.rebase_in_progress().unwrap());
}

#[test]
fn push_on_main_is_blocked() {
    let fx = Fixture::new();
    let exec = fx.executor();
    let settings = Settings::default();

    let decision = SyncEngine::new(&exec, &settings).plan_push().unwrap();
    assert!(matches!(decision, Decision::Blocked(_)));
}

#[test]
fn push_creates_upstream_for_new_branch() {
    let fx = Fixture::new();
    git(&fx.work, &["switch", "-c", "topic"]);
    commit_file(&fx.work, "topic.txt", "topic\n");

    let exec = fx.executor();
    let settings = Settings::default();
    let engine = SyncEngine::new(&exec, &settings);
    let Decision::Run(plan) = engine.plan_push().unwrap() else {
        panic!("expected a push plan");
    };
    assert_eq!(plan.steps[0].to_string(), "git push -u origin topic");
    engine.execute(&plan, |_| {}).unwrap();

    let state = BranchState::new(&exec, &settings).read().unwrap();
    assert!(state.tracked);
    let report = DivergenceAnalyzer::new(&exec, &settings).compute(&state).unwrap();
    assert!(report.local_ahead_of_remote.available);
    assert!(report.local_ahead_of_remote.is_empty());
}

#[test]
fn non_ascii_paths_are_reported_unquoted() {
    let fx = Fixture::new();
    let name = "caf\u{e9}.txt";
    git(&fx.work, &["switch", "-c", "feature"]);
    fs::write(fx.work.join(name), "espresso\n").unwrap();

    let exec = fx.executor();
    let settings = Settings::default();
    let branches = BranchState::new(&exec, &settings);
    assert_eq!(branches.untracked().unwrap(), vec![name]);

    let setup = Setup::new(&exec, &settings);
    let Decision::Run(plan) = setup.plan_add().unwrap() else {
        panic!("expected an add plan");
    };
    SyncEngine::new(&exec, &settings).execute(&plan, |_| {}).unwrap();
    git(&fx.work, &["commit", "-m", "add cafe"]);

    fs::write(fx.work.join(name), "ristretto\n").unwrap();
    let dirty = branches.uncommitted().unwrap();
    assert_eq!(dirty.len(), 1);
    assert_eq!(dirty[0].path, name);
    assert!(dirty[0].modified.is_some());

    let state = branches.read().unwrap();
    let report = DivergenceAnalyzer::new(&exec, &settings).compute(&state).unwrap();
    assert_eq!(report.local_ahead_of_main.files, vec![name]);
    assert!(report.working_tree.uncommitted_age.is_some());
}
