//! KVFerry - Record pipeline
//!
//! Everything between the line stream and the destination cache:
//!
//! ```text
//! [lines] -> decode -> TTL policy / validators -> dispatch -> [outcomes]
//! ```
//!
//! The [`BatchExecutor`] owns the outer loop: it reads lines sequentially,
//! groups them into bounded batches, and runs one pipeline pass per line on
//! a bounded worker pool. What a pass *does* is a [`LineProcessor`]:
//!
//! - [`Loader`] - decode, apply the TTL policy, write to the destination
//! - [`RecordChecker`] - decode and run the validator chain, no network
//! - [`Verifier`] - decode and compare against what the destination holds
//!
//! Every non-blank line ends in exactly one [`LineOutcome`], aggregated
//! into [`RunStats`] and echoed to the valid/error output streams.
//!
//! # Error isolation
//!
//! Per-line failures never stop a run: parse errors, validation rejections
//! and backend errors are recorded and the batch continues. Only total
//! failures (I/O on the streams, a panicked worker) abort.

mod checker;
mod executor;
#[cfg(test)]
mod testutil;
mod loader;
mod outcome;
mod stats;
mod ttl;
mod verifier;

pub use checker::RecordChecker;
pub use executor::{BatchExecutor, ExecutorConfig, OutputStreams};
pub use loader::Loader;
pub use outcome::{LineOutcome, LineProcessor, failure};
pub use stats::{RunStats, StatsReport};
pub use ttl::{TtlDecision, TtlPolicy};
pub use verifier::Verifier;

use thiserror::Error;

/// Total-failure conditions that abort a run.
///
/// Per-line errors are not represented here; they flow through
/// [`LineOutcome`] and the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading the line stream or writing an output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task died (panic or runtime shutdown)
    #[error("worker task failed: {0}")]
    Worker(String),
}
