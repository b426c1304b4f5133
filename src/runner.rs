//! Hardened git command execution.
//!
//! Everything in this crate that touches a repository goes through
//! [`run_git`] or [`run_git_capped`]. The wrapper launches the system `git`
//! binary with an environment that disables pagers, editors and credential
//! prompts, enforces a timeout, captures both output streams, and echoes
//! them for the user instead of letting the child talk to the terminal.
//!
//! A timed-out child is killed and reaped before the call returns; no git
//! process is left behind.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::debug;

/// Default timeout applied to git invocations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Echo cap for captured stdout in the capped variant.
pub const STDOUT_ECHO_CAP: usize = 2000;
/// Echo cap for captured stderr in the capped variant, applied on failure.
pub const STDERR_ECHO_CAP: usize = 1000;

const STDOUT_TRUNCATED: &str = "\n... (output truncated)";
const STDERR_TRUNCATED: &str = "\n... (error truncated)";

/// Environment overrides that keep git strictly non-interactive.
///
/// Applied on top of a copy of the ambient environment, so they win over
/// whatever the user has configured.
const HARDENING: &[(&str, &str)] = &[
    // no interactive authentication prompts
    ("GIT_TERMINAL_PROMPT", "0"),
    // `true` exits successfully without opening anything
    ("GIT_EDITOR", "true"),
    // degrade paging to a pass-through filter
    ("GIT_PAGER", "cat"),
    ("PAGER", "cat"),
    // clear pager feature flags that could re-enable paging
    ("LESS", ""),
    ("MORE", ""),
];

/// Outcome of a single git invocation.
///
/// Exactly one of the three cases holds for every call: the process ran to
/// completion, the timeout expired, or the process never launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process ran to completion with the given exit code.
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The timeout expired before the process exited; the child was killed.
    TimedOut { limit: Duration },
    /// The process could not be launched at all.
    LaunchFailed { error: String },
}

impl RunOutcome {
    /// True only for a completed run with exit code zero.
    pub fn success(&self) -> bool {
        matches!(self, RunOutcome::Completed { code: Some(0), .. })
    }

    /// Captured standard output; empty unless the run completed.
    pub fn stdout(&self) -> &str {
        match self {
            RunOutcome::Completed { stdout, .. } => stdout,
            _ => "",
        }
    }

    /// Captured standard error. For a launch failure this is the error
    /// description reported by the OS.
    pub fn stderr(&self) -> &str {
        match self {
            RunOutcome::Completed { stderr, .. } => stderr,
            RunOutcome::LaunchFailed { error } => error,
            RunOutcome::TimedOut { .. } => "",
        }
    }
}

/// Copy the ambient environment and apply the hardening overrides.
///
/// The returned map is passed explicitly into the process launch; the
/// ambient environment of this process is never mutated.
pub fn hardened_env() -> HashMap<String, String> {
    let mut env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();
    apply_hardening(&mut env);
    env
}

/// Insert the hardening overrides into `env`, replacing existing values.
pub fn apply_hardening(env: &mut HashMap<String, String>) {
    for (k, v) in HARDENING {
        env.insert((*k).to_string(), (*v).to_string());
    }
}

/// Prepend `--no-pager` to a git argument list unless it is already there.
///
/// Second line of defence next to the `GIT_PAGER` override. Idempotent.
pub fn with_no_pager(args: &[&str]) -> Vec<String> {
    let mut argv: Vec<String> = Vec::with_capacity(args.len() + 1);
    if !args.contains(&"--no-pager") {
        argv.push("--no-pager".to_string());
    }
    argv.extend(args.iter().map(|a| (*a).to_string()));
    argv
}

/// Cap `text` at `cap` characters, appending `marker` when truncation occurs.
pub fn truncate_for_echo(text: &str, cap: usize, marker: &str) -> String {
    match text.char_indices().nth(cap) {
        None => text.to_string(),
        Some((idx, _)) => {
            let mut capped = text[..idx].to_string();
            capped.push_str(marker);
            capped
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EchoStyle {
    /// Echo both captured streams in full.
    Full,
    /// Cap stdout at [`STDOUT_ECHO_CAP`] characters; echo stderr only on
    /// failure, capped at [`STDERR_ECHO_CAP`].
    Capped,
}

/// Run `git` with the given arguments in `dir`, echoing output in full.
pub fn run_git(dir: &Path, args: &[&str], timeout: Duration) -> RunOutcome {
    run_git_with_style(dir, args, timeout, EchoStyle::Full)
}

/// Run `git` with the given arguments in `dir`, echoing truncated output.
///
/// Used by the push workflow. Truncation affects the echo only; the
/// returned outcome carries the full captured text.
pub fn run_git_capped(dir: &Path, args: &[&str], timeout: Duration) -> RunOutcome {
    run_git_with_style(dir, args, timeout, EchoStyle::Capped)
}

fn run_git_with_style(dir: &Path, args: &[&str], timeout: Duration, style: EchoStyle) -> RunOutcome {
    let argv = with_no_pager(args);
    println!("{} git {}", "running:".cyan(), argv.join(" "));

    let outcome = run_command("git", dir, &argv, &hardened_env(), timeout);
    echo(&outcome, style);
    outcome
}

fn echo(outcome: &RunOutcome, style: EchoStyle) {
    match outcome {
        RunOutcome::Completed {
            code,
            stdout,
            stderr,
        } => match style {
            EchoStyle::Full => {
                if !stdout.is_empty() {
                    println!("{}", stdout.trim_end());
                }
                if !stderr.is_empty() {
                    eprintln!("{} {}", "warning:".yellow(), stderr.trim_end());
                }
            }
            EchoStyle::Capped => {
                let out = stdout.trim();
                if !out.is_empty() {
                    println!(
                        "{}",
                        truncate_for_echo(out, STDOUT_ECHO_CAP, STDOUT_TRUNCATED)
                    );
                }
                let err = stderr.trim();
                if !matches!(code, Some(0)) && !err.is_empty() {
                    eprintln!(
                        "{} {}",
                        "error:".red(),
                        truncate_for_echo(err, STDERR_ECHO_CAP, STDERR_TRUNCATED)
                    );
                }
            }
        },
        RunOutcome::TimedOut { limit } => {
            eprintln!(
                "{} command timed out after {}s",
                "error:".red(),
                limit.as_secs()
            );
        }
        RunOutcome::LaunchFailed { error } => {
            eprintln!("{} failed to launch git: {}", "error:".red(), error);
        }
    }
}

/// Launch `program` and wait for completion, enforcing `timeout`.
///
/// Both pipes are drained on background threads so a child writing more
/// than the pipe buffer cannot stall the wait loop.
fn run_command(
    program: &str,
    dir: &Path,
    args: &[String],
    env: &HashMap<String, String>,
    timeout: Duration,
) -> RunOutcome {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(%program, ?args, "spawning");

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome::LaunchFailed {
                error: e.to_string(),
            };
        }
    };

    let stdout_pipe = drain(child.stdout.take());
    let stderr_pipe = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    kill_and_reap(&mut child);
                    return RunOutcome::TimedOut { limit: timeout };
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_and_reap(&mut child);
                return RunOutcome::LaunchFailed {
                    error: e.to_string(),
                };
            }
        }
    };

    RunOutcome::Completed {
        code: status.code(),
        stdout: join_drained(stdout_pipe),
        stderr: join_drained(stderr_pipe),
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drained(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle.and_then(|h| h.join().ok()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hardening_overrides_ambient_values() {
        let mut env = HashMap::new();
        env.insert("GIT_PAGER".to_string(), "less".to_string());
        env.insert("LESS".to_string(), "-RFX".to_string());
        env.insert("UNRELATED".to_string(), "kept".to_string());

        apply_hardening(&mut env);

        assert_eq!(env.get("GIT_TERMINAL_PROMPT").map(String::as_str), Some("0"));
        assert_eq!(env.get("GIT_EDITOR").map(String::as_str), Some("true"));
        assert_eq!(env.get("GIT_PAGER").map(String::as_str), Some("cat"));
        assert_eq!(env.get("PAGER").map(String::as_str), Some("cat"));
        assert_eq!(env.get("LESS").map(String::as_str), Some(""));
        assert_eq!(env.get("MORE").map(String::as_str), Some(""));
        assert_eq!(env.get("UNRELATED").map(String::as_str), Some("kept"));
    }

    #[test]
    fn hardened_env_always_carries_the_overrides() {
        let env = hardened_env();
        for (k, v) in HARDENING {
            assert_eq!(env.get(*k).map(String::as_str), Some(*v), "{k}");
        }
    }

    #[test]
    fn no_pager_flag_inserted_after_tool_name() {
        let argv = with_no_pager(&["status", "--porcelain"]);
        assert_eq!(argv, vec!["--no-pager", "status", "--porcelain"]);
    }

    #[test]
    fn no_pager_flag_not_inserted_twice() {
        let once = with_no_pager(&["log", "--oneline"]);
        let as_strs: Vec<&str> = once.iter().map(String::as_str).collect();
        let twice = with_no_pager(&as_strs);
        assert_eq!(
            twice.iter().filter(|a| a.as_str() == "--no-pager").count(),
            1
        );
        assert_eq!(twice, once);
    }

    #[test]
    fn truncation_applies_over_cap() {
        let long = "x".repeat(2500);
        let echoed = truncate_for_echo(&long, STDOUT_ECHO_CAP, STDOUT_TRUNCATED);
        assert!(echoed.starts_with(&"x".repeat(STDOUT_ECHO_CAP)));
        assert!(echoed.ends_with(STDOUT_TRUNCATED));
        assert_eq!(echoed.len(), STDOUT_ECHO_CAP + STDOUT_TRUNCATED.len());
    }

    #[test]
    fn truncation_leaves_short_text_alone() {
        let short = "y".repeat(1500);
        assert_eq!(
            truncate_for_echo(&short, STDOUT_ECHO_CAP, STDOUT_TRUNCATED),
            short
        );
        let exact = "z".repeat(STDOUT_ECHO_CAP);
        assert_eq!(
            truncate_for_echo(&exact, STDOUT_ECHO_CAP, STDOUT_TRUNCATED),
            exact
        );
    }

    #[test]
    fn success_requires_exit_zero() {
        let completed = |code| RunOutcome::Completed {
            code: Some(code),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(completed(0).success());
        assert!(!completed(1).success());
        assert!(!completed(128).success());
        assert!(
            !RunOutcome::TimedOut {
                limit: DEFAULT_TIMEOUT
            }
            .success()
        );
        assert!(
            !RunOutcome::LaunchFailed {
                error: "no such file".to_string()
            }
            .success()
        );
    }

    #[cfg(unix)]
    #[test]
    fn run_command_reports_exit_codes() {
        let td = tempdir().unwrap();
        for (script, want) in [("exit 0", true), ("exit 1", false), ("exit 128", false)] {
            let outcome = run_command(
                "sh",
                td.path(),
                &["-c".to_string(), script.to_string()],
                &hardened_env(),
                DEFAULT_TIMEOUT,
            );
            assert_eq!(outcome.success(), want, "{script}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn run_command_collects_output_past_the_pipe_buffer() {
        let td = tempdir().unwrap();
        let outcome = run_command(
            "sh",
            td.path(),
            &["-c".to_string(), "yes y | head -c 200000".to_string()],
            &hardened_env(),
            DEFAULT_TIMEOUT,
        );
        assert!(outcome.success());
        assert_eq!(outcome.stdout().len(), 200_000);
    }

    #[cfg(unix)]
    #[test]
    fn run_command_times_out_and_kills_the_child() {
        let td = tempdir().unwrap();
        let start = Instant::now();
        let outcome = run_command(
            "sh",
            td.path(),
            &["-c".to_string(), "sleep 30".to_string()],
            &hardened_env(),
            Duration::from_millis(200),
        );
        assert!(matches!(outcome, RunOutcome::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn missing_binary_is_a_launch_failure() {
        let td = tempdir().unwrap();
        let outcome = run_command(
            "margin-calc-no-such-tool",
            td.path(),
            &[],
            &hardened_env(),
            DEFAULT_TIMEOUT,
        );
        match outcome {
            RunOutcome::LaunchFailed { error } => assert!(!error.is_empty()),
            other => panic!("expected launch failure, got {other:?}"),
        }
    }
}
