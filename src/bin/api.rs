//! `margin-calc-api`: placeholder HTTP API server.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use margin_calc::server;

/// Margin Calc API server.
#[derive(Parser, Debug)]
#[command(name = "margin-calc-api", version, about = "Margin Calc API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr: SocketAddr = match args.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid listen address {}: {}", args.listen, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::serve(addr).await {
        error!("server error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
