//! Repository inspection commands.
//!
//! Thin wrappers over [`run_git`]: print a section header, run the git
//! command, report whether it exited cleanly. Output echoing is handled by
//! the runner.

use std::path::Path;

use colored::Colorize;

use crate::runner::{DEFAULT_TIMEOUT, run_git};

fn section(title: &str) {
    println!("\n{}", title.bold());
}

/// `git status`
pub fn status(dir: &Path) -> bool {
    section("Repository status");
    run_git(dir, &["status"], DEFAULT_TIMEOUT).success()
}

/// `git log --oneline -<count>`
pub fn log(dir: &Path, count: u32) -> bool {
    section(&format!("Recent {count} commits"));
    run_git(dir, &["log", "--oneline", &format!("-{count}")], DEFAULT_TIMEOUT).success()
}

/// `git branch -a`
pub fn branches(dir: &Path) -> bool {
    section("All branches");
    run_git(dir, &["branch", "-a"], DEFAULT_TIMEOUT).success()
}

/// `git diff <target>`
pub fn diff(dir: &Path, target: &str) -> bool {
    section(&format!("Differences vs {target}"));
    run_git(dir, &["diff", target], DEFAULT_TIMEOUT).success()
}

/// `git fetch origin`
pub fn fetch(dir: &Path) -> bool {
    section("Fetching from remote");
    run_git(dir, &["fetch", "origin"], DEFAULT_TIMEOUT).success()
}

/// `git remote -v`, then the remote comparison via `git status -uno`.
///
/// The comparison is informational; only the `remote -v` result decides
/// success.
pub fn remote_status(dir: &Path) -> bool {
    section("Remote status");
    let ok = run_git(dir, &["remote", "-v"], DEFAULT_TIMEOUT).success();
    if ok {
        section("Remote comparison");
        run_git(dir, &["status", "-uno"], DEFAULT_TIMEOUT);
    }
    ok
}

/// `git show <commit> --name-only`
pub fn show_commit(dir: &Path, commit: &str) -> bool {
    section(&format!("Commit details ({commit})"));
    run_git(dir, &["show", commit, "--name-only"], DEFAULT_TIMEOUT).success()
}

/// `git stash list`
pub fn stash_list(dir: &Path) -> bool {
    section("Stashed changes");
    run_git(dir, &["stash", "list"], DEFAULT_TIMEOUT).success()
}

/// Run the comprehensive inspection: status, recent log, branches, remote
/// state and stashes.
///
/// Always reports success; individual command failures are already visible
/// on their own lines.
pub fn all(dir: &Path) -> bool {
    println!("{}", "running comprehensive git inspection".bold());
    status(dir);
    log(dir, 5);
    branches(dir);
    remote_status(dir);
    stash_list(dir);
    true
}
