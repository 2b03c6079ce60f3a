//! Load command - move a dump file into the destination cache

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs::File;
use tokio::io::BufReader;

use kvferry_cache::{CacheClient, CacheCreate, HttpCacheClient};
use kvferry_pipeline::{BatchExecutor, ExecutorConfig, Loader, OutputStreams, TtlPolicy};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Load command arguments
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Path to the dump file to load
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

    /// Create the cache if it does not exist
    #[arg(long)]
    pub create_cache: bool,

    /// Client-side default TTL in seconds for records without one
    #[arg(long)]
    pub default_ttl_secs: Option<u64>,

    /// Clip TTLs longer than this many days down to it
    #[arg(long)]
    pub max_ttl_days: Option<u64>,

    /// Load already-expired records with the default TTL instead of
    /// skipping them. For testing against aging snapshots, not live
    /// migrations.
    #[arg(long)]
    pub reset_expired_to_default: bool,

    /// Maximum in-flight destination calls
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Lines buffered per batch
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,
}

/// Run the load command
pub async fn run(args: LoadArgs) -> Result<()> {
    let file = File::open(&args.data_path)
        .await
        .with_context(|| format!("cannot open {}", args.data_path.display()))?;

    let client = HttpCacheClient::new(&args.endpoint, &args.token, args.cache.clone())
        .context("failed to build cache client")?
        .with_default_ttl(args.default_ttl_secs.map(Duration::from_secs));
    let client: Arc<dyn CacheClient> = Arc::new(client);

    if args.create_cache {
        match client
            .create_cache()
            .await
            .context("failed to create cache")?
        {
            CacheCreate::Created => tracing::info!(cache = %args.cache, "cache created"),
            CacheCreate::AlreadyExists => {
                tracing::info!(cache = %args.cache, "cache already exists")
            }
        }
    }

    if args.reset_expired_to_default {
        tracing::info!("resetting already-expired records to the default TTL");
    }

    let policy = TtlPolicy::new()
        .with_max_ttl(
            args.max_ttl_days
                .map(|days| Duration::from_secs(days * SECS_PER_DAY)),
        )
        .reset_expired_to_default(args.reset_expired_to_default);

    tracing::info!(
        data = %args.data_path.display(),
        cache = %args.cache,
        "extracting dump and loading into destination"
    );

    let executor = BatchExecutor::new(ExecutorConfig {
        concurrency: args.concurrency,
        batch_size: args.batch_size,
        ..Default::default()
    });
    let mut streams = OutputStreams::create(None, Some(&args.error_path))
        .await
        .with_context(|| format!("cannot create {}", args.error_path.display()))?;

    let report = executor
        .run(
            BufReader::new(file),
            Arc::new(Loader::new(client, policy)),
            &mut streams,
        )
        .await?;

    report.log_summary();
    Ok(())
}
