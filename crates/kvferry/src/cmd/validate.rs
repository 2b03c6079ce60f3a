//! Validate command - screen a dump against the validation policy, offline
//!
//! Valid lines are echoed to VALID_PATH for loading; rejected lines go to
//! ERROR_PATH as `reason\tline` for inspection or reprocessing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::fs::File;
use tokio::io::BufReader;

use kvferry_pipeline::{BatchExecutor, ExecutorConfig, OutputStreams, RecordChecker};
use kvferry_validate::{HasTtl, HasntAlreadyExpired, PayloadSize, TtlInRange, ValidatorChain};

/// Validate command arguments
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the dump file to screen
    #[arg(value_name = "DATA_PATH")]
    pub data_path: PathBuf,

    /// Path to write valid lines to
    #[arg(value_name = "VALID_PATH")]
    pub valid_path: PathBuf,

    /// Path to write rejected lines to, as `reason\tline`
    #[arg(value_name = "ERROR_PATH")]
    pub error_path: PathBuf,

    /// Max payload size in MiB, inclusive
    #[arg(long, default_value_t = 1)]
    pub max_payload_size: usize,

    /// Screen for payloads that exceed the max
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub filter_large_data: bool,

    /// Max TTL in days, inclusive
    #[arg(long, default_value_t = 1)]
    pub max_ttl: i64,

    /// Screen for TTLs that exceed the max
    #[arg(long)]
    pub filter_long_ttl: bool,

    /// Screen for records that have already expired
    #[arg(long)]
    pub filter_already_expired: bool,

    /// Screen for records with no TTL set
    #[arg(long)]
    pub filter_missing_ttl: bool,
}

/// Run the validate command
pub async fn run(args: ValidateArgs) -> Result<()> {
    if args.filter_large_data && args.max_payload_size == 0 {
        bail!("--max-payload-size must be strictly positive");
    }
    if args.filter_long_ttl && args.max_ttl <= 0 {
        bail!("--max-ttl must be strictly positive");
    }

    let file = File::open(&args.data_path)
        .await
        .with_context(|| format!("cannot open {}", args.data_path.display()))?;

    let mut chain = ValidatorChain::new();
    if args.filter_large_data {
        tracing::info!(
            max_mib = args.max_payload_size,
            "screening payloads larger than the max"
        );
        chain.push(PayloadSize::from_mib(args.max_payload_size));
    }
    if args.filter_long_ttl {
        tracing::info!(max_days = args.max_ttl, "screening TTLs greater than the max");
        chain.push(TtlInRange::from_days(args.max_ttl));
    }
    if args.filter_already_expired {
        tracing::info!("screening records that have already expired");
        chain.push(HasntAlreadyExpired);
    }
    if args.filter_missing_ttl {
        tracing::info!("screening records with no TTL set");
        chain.push(HasTtl);
    }

    tracing::info!(
        data = %args.data_path.display(),
        valid = %args.valid_path.display(),
        errors = %args.error_path.display(),
        validators = ?chain.names(),
        "screening dump"
    );

    // Offline and CPU-bound: no reason to fan out.
    let executor = BatchExecutor::new(ExecutorConfig {
        concurrency: 1,
        ..Default::default()
    });
    let mut streams = OutputStreams::create(Some(&args.valid_path), Some(&args.error_path))
        .await
        .context("cannot create output streams")?;

    let report = executor
        .run(
            BufReader::new(file),
            Arc::new(RecordChecker::new(chain)),
            &mut streams,
        )
        .await?;

    report.log_summary();
    Ok(())
}
