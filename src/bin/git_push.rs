//! `git-push`: stage, commit and push pending changes in one shot.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use margin_calc::push::{PushOutcome, run_workflow};
use margin_calc::write_sample_config;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "git-push",
    version,
    about = "Stage, commit and push pending changes without pager hangs"
)]
struct Cli {
    /// Create a sample .git-config.json and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> ExitCode {
    // SIGINT is reported as a cancelled run, not a crash.
    let _ = ctrlc::set_handler(|| {
        eprintln!("\n{}", "operation cancelled by user".yellow());
        std::process::exit(1);
    });

    let cli = Cli::parse();
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if cli.init_config {
        return match write_sample_config(&dir) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {e:#}", "✘".red());
                ExitCode::FAILURE
            }
        };
    }

    match run_workflow(&dir) {
        Ok(PushOutcome::Clean) => {
            println!(
                "\n{} nothing to commit, repository is up to date",
                "✔".green()
            );
            ExitCode::SUCCESS
        }
        Ok(PushOutcome::Pushed) => {
            println!(
                "\n{} git push workflow completed successfully",
                "✔".green()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\n{} {e:#}", "✘".red());
            ExitCode::FAILURE
        }
    }
}
