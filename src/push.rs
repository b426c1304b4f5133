//! Stage, commit and push workflow.
//!
//! A linear sequence of git calls through the hardened runner: check status
//! in porcelain format, stage everything, commit with a generated message,
//! push, verify. The first failing step aborts the workflow; a clean tree
//! short-circuits to success without touching the repository.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use colored::Colorize;

use crate::config::{PushConfig, load_config};
use crate::project::{ProjectProfile, detect_project};
use crate::runner::{DEFAULT_TIMEOUT, run_git_capped};

/// Timeout for the network-bound push step.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(90);

/// Number of changed paths listed before the rest is elided.
const CHANGE_LISTING_LIMIT: usize = 10;

/// Terminal state of a successful workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Nothing to commit; the repository was already clean.
    Clean,
    /// Changes were staged, committed and pushed.
    Pushed,
}

/// Compose the commit message: `<prefix>(<scope>): <description> - <date>`.
///
/// Scope and description come from project detection, the prefix from the
/// configuration file.
pub fn commit_message(config: &PushConfig, profile: &ProjectProfile, date: NaiveDate) -> String {
    format!(
        "{}({}): {} - {}",
        config.commit_prefix,
        profile.scope,
        profile.description,
        date.format("%Y-%m-%d")
    )
}

/// Split porcelain status output into one entry per changed path.
pub fn parse_changes(porcelain: &str) -> Vec<String> {
    porcelain
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_status(dir: &Path) -> Result<Vec<String>> {
    println!("\n{}", "Checking repository status".bold());
    let outcome = run_git_capped(dir, &["status", "--porcelain"], DEFAULT_TIMEOUT);
    if !outcome.success() {
        bail!("failed to read repository status");
    }

    let changes = parse_changes(outcome.stdout());
    if changes.is_empty() {
        println!("{} repository is clean, nothing to commit", "✔".green());
        return Ok(changes);
    }

    println!("found {} change(s):", changes.len());
    for change in changes.iter().take(CHANGE_LISTING_LIMIT) {
        println!("   {change}");
    }
    if changes.len() > CHANGE_LISTING_LIMIT {
        println!("   ... and {} more", changes.len() - CHANGE_LISTING_LIMIT);
    }
    Ok(changes)
}

fn stage_changes(dir: &Path) -> Result<()> {
    println!("\n{}", "Staging all changes".bold());
    if !run_git_capped(dir, &["add", "."], DEFAULT_TIMEOUT).success() {
        bail!("failed to stage changes");
    }
    println!("{} all changes staged", "✔".green());
    Ok(())
}

fn commit_changes(dir: &Path, config: &PushConfig, profile: &ProjectProfile) -> Result<()> {
    println!("\n{}", "Committing changes".bold());
    let message = commit_message(config, profile, chrono::Local::now().date_naive());
    // Structured argv; the message needs no shell escaping.
    if !run_git_capped(dir, &["commit", "-m", &message], DEFAULT_TIMEOUT).success() {
        bail!("failed to commit changes");
    }
    println!("{} committed: {}", "✔".green(), message);
    Ok(())
}

fn push_to_remote(dir: &Path, config: &PushConfig) -> Result<()> {
    let remote = config.remote_name.as_str();
    let branch = config.default_branch.as_str();
    println!("\n{}", format!("Pushing to {remote} {branch}").bold());

    let outcome = run_git_capped(dir, &["push", remote, branch], PUSH_TIMEOUT);
    if !outcome.success() {
        if outcome.stderr().to_lowercase().contains("rejected") {
            println!(
                "{} you may need to pull remote changes first",
                "hint:".yellow()
            );
        }
        bail!("failed to push to {remote} {branch}");
    }
    println!("{} pushed to {remote} {branch}", "✔".green());
    Ok(())
}

/// Best-effort check that the tree is clean after the push. Does not affect
/// the workflow result.
fn verify_push(dir: &Path) {
    println!("\n{}", "Verifying push status".bold());
    let outcome = run_git_capped(dir, &["status", "--porcelain"], DEFAULT_TIMEOUT);
    if outcome.success() && outcome.stdout().trim().is_empty() {
        println!("{} repository is clean and synchronized", "✔".green());
    } else {
        println!(
            "{} repository may have remaining changes",
            "warning:".yellow()
        );
    }
}

/// Run the full stage, commit and push workflow in `dir`.
///
/// A clean repository short-circuits to [`PushOutcome::Clean`] without
/// staging or committing anything.
///
/// # Errors
/// Any failing step aborts the workflow after printing its diagnostic; the
/// error carries a one-line summary of the failed step.
pub fn run_workflow(dir: &Path) -> Result<PushOutcome> {
    let config = load_config(dir);
    let profile = detect_project(dir);

    println!("{}", "Starting git push workflow".bold());
    println!("pager and prompt hardening enabled, timeout protection enabled");
    println!("project type detected: {}", profile.kind.label());

    let changes = check_status(dir)?;
    if changes.is_empty() {
        return Ok(PushOutcome::Clean);
    }

    stage_changes(dir)?;
    commit_changes(dir, &config, &profile)?;
    push_to_remote(dir, &config)?;
    verify_push(dir);

    Ok(PushOutcome::Pushed)
}
