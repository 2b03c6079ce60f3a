//! Verify command - read back and compare against the destination

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs::File;
use tokio::io::BufReader;

use kvferry_cache::{CacheClient, HttpCacheClient};
use kvferry_pipeline::{BatchExecutor, ExecutorConfig, OutputStreams, Verifier};

/// Verify command arguments
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the dump file to verify against
    #[arg(value_name = "DATA_PATH")]
    pub data_path: PathBuf,

    /// Path to write failed lines to, as `reason\tline`
    #[arg(value_name = "ERROR_PATH")]
    pub error_path: PathBuf,

    /// Destination cache service endpoint
    #[arg(long)]
    pub endpoint: String,

    /// Auth token for the destination service
    #[arg(long, env = "KVFERRY_AUTH_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Destination cache name
    #[arg(long)]
    pub cache: String,

    /// Maximum in-flight destination calls
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}

/// Run the verify command
pub async fn run(args: VerifyArgs) -> Result<()> {
    let file = File::open(&args.data_path)
        .await
        .with_context(|| format!("cannot open {}", args.data_path.display()))?;

    let client = HttpCacheClient::new(&args.endpoint, &args.token, args.cache.clone())
        .context("failed to build cache client")?;
    let client: Arc<dyn CacheClient> = Arc::new(client);

    tracing::info!(
        data = %args.data_path.display(),
        cache = %args.cache,
        "extracting dump and verifying against destination"
    );

    let executor = BatchExecutor::new(ExecutorConfig {
        concurrency: args.concurrency,
        ..Default::default()
    });
    let mut streams = OutputStreams::create(None, Some(&args.error_path))
        .await
        .with_context(|| format!("cannot create {}", args.error_path.display()))?;

    let report = executor
        .run(BufReader::new(file), Arc::new(Verifier::new(client)), &mut streams)
        .await?;

    report.log_summary();
    Ok(())
}
