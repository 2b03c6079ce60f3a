//! Batch executor - the pipeline's outer loop
//!
//! Reads lines sequentially, buffers them into fixed-size batches, and runs
//! one [`LineProcessor`] pass per line on a worker pool bounded by a
//! semaphore. Worker results come back through the task set to a single
//! aggregator, which owns the counters and the output streams - workers
//! never share writers.
//!
//! Ordering between records is neither required nor provided; only the
//! aggregate counts are deterministic.

use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufWriter};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{LineOutcome, LineProcessor, PipelineError, RunStats, StatsReport};

/// Tuning knobs for one run.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Maximum in-flight pipeline passes
    pub concurrency: usize,

    /// Lines buffered per batch; raised to `concurrency` if smaller
    pub batch_size: usize,

    /// Log progress every this many processed lines
    pub progress_every: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            batch_size: 256,
            progress_every: 10_000,
        }
    }
}

/// Valid/error output streams for a run.
///
/// Either stream is optional: load mode has no valid stream, verify mode
/// typically writes errors only.
pub struct OutputStreams {
    valid: Option<BufWriter<File>>,
    error: Option<BufWriter<File>>,
}

impl OutputStreams {
    /// No output streams; outcomes are counted but not echoed.
    pub fn none() -> Self {
        Self {
            valid: None,
            error: None,
        }
    }

    /// Create the configured streams, truncating existing files.
    pub async fn create(
        valid_path: Option<&Path>,
        error_path: Option<&Path>,
    ) -> std::io::Result<Self> {
        let valid = match valid_path {
            Some(path) => Some(BufWriter::new(File::create(path).await?)),
            None => None,
        };
        let error = match error_path {
            Some(path) => Some(BufWriter::new(File::create(path).await?)),
            None => None,
        };
        Ok(Self { valid, error })
    }

    /// Echo a line that passed, for downstream loading.
    async fn write_valid(&mut self, line: &str) -> std::io::Result<()> {
        if let Some(writer) = &mut self.valid {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        Ok(())
    }

    /// Record a failed line as `reason\tline`, reprocessable as-is.
    async fn write_error(&mut self, tag: &str, line: &str) -> std::io::Result<()> {
        if let Some(writer) = &mut self.error {
            writer.write_all(tag.as_bytes()).await?;
            writer.write_all(b"\t").await?;
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        if let Some(writer) = &mut self.valid {
            writer.flush().await?;
        }
        if let Some(writer) = &mut self.error {
            writer.flush().await?;
        }
        Ok(())
    }
}

/// Bounded-concurrency executor over a line stream.
pub struct BatchExecutor {
    config: ExecutorConfig,
}

impl BatchExecutor {
    /// Executor with the given tuning. `batch_size` is raised to
    /// `concurrency` so a batch can always fill the pool.
    pub fn new(mut config: ExecutorConfig) -> Self {
        config.concurrency = config.concurrency.max(1);
        config.batch_size = config.batch_size.max(config.concurrency);
        config.progress_every = config.progress_every.max(1);
        Self { config }
    }

    /// Drain `reader`, running one pass per non-blank line.
    ///
    /// Returns the aggregate counts. Per-line failures are recorded and do
    /// not stop the run; I/O failures and worker panics do.
    pub async fn run<R>(
        &self,
        reader: R,
        processor: Arc<dyn LineProcessor>,
        streams: &mut OutputStreams,
    ) -> Result<StatsReport, PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        tracing::info!(
            mode = processor.mode(),
            concurrency = self.config.concurrency,
            batch_size = self.config.batch_size,
            "starting run"
        );

        let stats = Arc::new(RunStats::new());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut lines = reader.lines();
        let mut eof = false;

        while !eof {
            let mut batch = Vec::with_capacity(self.config.batch_size);
            while batch.len() < self.config.batch_size {
                match lines.next_line().await? {
                    Some(line) => {
                        let trimmed = line.trim();
                        // Blank lines are skipped without touching counters.
                        if trimmed.is_empty() {
                            continue;
                        }
                        batch.push(trimmed.to_string());
                    }
                    None => {
                        eof = true;
                        break;
                    }
                }
            }
            if batch.is_empty() {
                break;
            }

            self.run_batch(batch, &processor, &semaphore, &stats, streams)
                .await?;
        }

        streams.flush().await?;

        let report = stats.snapshot();
        tracing::info!(
            mode = processor.mode(),
            total = report.total,
            ok = report.ok,
            error = report.error,
            filtered = report.filtered,
            "run finished"
        );
        Ok(report)
    }

    /// Fan one batch out to the worker pool and aggregate its outcomes.
    async fn run_batch(
        &self,
        batch: Vec<String>,
        processor: &Arc<dyn LineProcessor>,
        semaphore: &Arc<Semaphore>,
        stats: &Arc<RunStats>,
        streams: &mut OutputStreams,
    ) -> Result<(), PipelineError> {
        let mut tasks = JoinSet::new();

        for line in batch {
            let permit = Arc::clone(semaphore)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;
            let processor = Arc::clone(processor);
            tasks.spawn(async move {
                let outcome = processor.process(&line).await;
                drop(permit);
                (outcome, line)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (outcome, line) = joined.map_err(|e| PipelineError::Worker(e.to_string()))?;
            stats.record(&outcome);

            match outcome {
                LineOutcome::Ok => streams.write_valid(&line).await?,
                LineOutcome::Filtered(_) => {}
                LineOutcome::Rejected(reason) => {
                    streams.write_error(reason.as_str(), &line).await?;
                }
                LineOutcome::Failed(tag) => streams.write_error(tag, &line).await?,
            }

            let processed = stats.total();
            if processed % self.config.progress_every == 0 {
                tracing::info!(processed, "progress");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
