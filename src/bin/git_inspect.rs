//! `git-inspect`: read-only repository inspection without pager hangs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;

use margin_calc::inspect;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "git-inspect",
    version,
    about = "Git inspection wrapper with pager and prompt hardening"
)]
struct Cli {
    /// Inspection command to run
    #[arg(value_enum)]
    command: Inspect,

    /// Number of commits to show (log)
    #[arg(long, default_value_t = 5)]
    count: u32,

    /// Commit to inspect (show)
    #[arg(long, default_value = "HEAD")]
    commit: String,

    /// Target for diff comparison
    #[arg(long, default_value = "HEAD")]
    target: String,
}

/// Available inspection commands.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum Inspect {
    /// Check repository status
    Status,
    /// Show recent commits
    Log,
    /// Show all branches
    Branches,
    /// Show differences against a target
    Diff,
    /// Fetch latest changes from the remote
    Fetch,
    /// Check remote status
    Remote,
    /// Show commit details
    Show,
    /// Show stashed changes
    Stash,
    /// Run the comprehensive inspection
    All,
}

fn main() -> ExitCode {
    // SIGINT is reported as a cancelled run, not a crash.
    let _ = ctrlc::set_handler(|| {
        eprintln!("\n{}", "operation cancelled by user".yellow());
        std::process::exit(1);
    });

    let cli = Cli::parse();
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    println!(
        "{}",
        "git inspector (pager and prompt hardening enabled)".bold()
    );
    println!("{}", "=".repeat(50));

    let ok = match cli.command {
        Inspect::Status => inspect::status(&dir),
        Inspect::Log => inspect::log(&dir, cli.count),
        Inspect::Branches => inspect::branches(&dir),
        Inspect::Diff => inspect::diff(&dir, &cli.target),
        Inspect::Fetch => inspect::fetch(&dir),
        Inspect::Remote => inspect::remote_status(&dir),
        Inspect::Show => inspect::show_commit(&dir, &cli.commit),
        Inspect::Stash => inspect::stash_list(&dir),
        Inspect::All => inspect::all(&dir),
    };

    println!("\n{}", "=".repeat(50));
    if ok {
        println!("{} git inspection completed successfully", "✔".green());
        ExitCode::SUCCESS
    } else {
        println!("{} git inspection completed with warnings", "✘".red());
        ExitCode::FAILURE
    }
}
