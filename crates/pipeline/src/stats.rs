//! Run statistics
//!
//! One [`RunStats`] per run, shared across workers via `Arc` and returned
//! at the end as a plain [`StatsReport`]. No process-global state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::LineOutcome;

/// Thread-safe outcome counters for one run.
///
/// Counters use relaxed atomics; the per-reason histogram sits behind a
/// mutex taken only on the error path.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Lines that reached a terminal classification
    total: AtomicU64,

    /// Dispatch/validation/verification successes
    ok: AtomicU64,

    /// Parse, validation and dispatch failures
    error: AtomicU64,

    /// Policy-driven skips (success-like)
    filtered: AtomicU64,

    /// Error occurrences by reason tag
    reasons: Mutex<BTreeMap<&'static str, u64>>,
}

impl RunStats {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one line's terminal outcome.
    pub fn record(&self, outcome: &LineOutcome) {
        self.total.fetch_add(1, Ordering::Relaxed);
        match outcome {
            LineOutcome::Ok => {
                self.ok.fetch_add(1, Ordering::Relaxed);
            }
            LineOutcome::Filtered(_) => {
                self.filtered.fetch_add(1, Ordering::Relaxed);
            }
            LineOutcome::Rejected(reason) => {
                self.error.fetch_add(1, Ordering::Relaxed);
                self.record_reason(reason.as_str());
            }
            LineOutcome::Failed(tag) => {
                self.error.fetch_add(1, Ordering::Relaxed);
                self.record_reason(tag);
            }
        }
    }

    fn record_reason(&self, tag: &'static str) {
        *self.reasons.lock().entry(tag).or_insert(0) += 1;
    }

    /// Lines with a terminal classification so far.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsReport {
        StatsReport {
            total: self.total.load(Ordering::Relaxed),
            ok: self.ok.load(Ordering::Relaxed),
            error: self.error.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            reasons: self.reasons.lock().clone(),
        }
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsReport {
    /// Lines that reached a terminal classification
    pub total: u64,
    /// Successes
    pub ok: u64,
    /// Errors of any kind
    pub error: u64,
    /// Policy-driven skips
    pub filtered: u64,
    /// Error occurrences by reason tag
    pub reasons: BTreeMap<&'static str, u64>,
}

impl StatsReport {
    /// Log the stats block at the end of a run.
    pub fn log_summary(&self) {
        tracing::info!("==== STATS ====");
        tracing::info!(
            total = self.total,
            ok = self.ok,
            error = self.error,
            filtered = self.filtered,
            "run totals"
        );
        for (&reason, &count) in &self.reasons {
            tracing::info!(reason, count, "error breakdown");
        }
    }
}
