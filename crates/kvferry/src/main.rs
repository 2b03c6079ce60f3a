//! KVFerry - migrate key-value dump files into a remote cache
//!
//! # Usage
//!
//! ```bash
//! # Screen a dump against the validation policy
//! kvferry validate dump.jsonl valid.jsonl errors.tsv
//!
//! # Load a dump into the destination cache
//! kvferry load dump.jsonl errors.tsv \
//!     --endpoint https://cache.example.com --cache prod --create-cache
//!
//! # Read back and compare
//! kvferry verify dump.jsonl errors.tsv \
//!     --endpoint https://cache.example.com --cache prod
//!
//! # Split a dump for parallel loading
//! kvferry split dump.jsonl chunk. --chunks 8
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// KVFerry - migrate key-value dump files into a remote cache
#[derive(Parser, Debug)]
#[command(name = "kvferry")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a dump file into the destination cache
    Load(cmd::load::LoadArgs),

    /// Screen a dump file against the validation policy, offline
    Validate(cmd::validate::ValidateArgs),

    /// Compare a dump file against what the destination holds
    Verify(cmd::verify::VerifyArgs),

    /// Split a dump file into equal-sized chunks
    Split(cmd::split::SplitArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Load(args) => cmd::load::run(args).await,
        Command::Validate(args) => cmd::validate::run(args).await,
        Command::Verify(args) => cmd::verify::run(args).await,
        Command::Split(args) => cmd::split::run(args),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}
