//! TTL policy applied between decode and dispatch
//!
//! A point-in-time snapshot of a source store ages between export and
//! import. Without this policy, TTLs read from the dump would either be
//! rejected outright (already in the past) or silently exceed service-side
//! limits. The policy decides, per record, what TTL to transmit - or that
//! the record should not be transmitted at all.

use std::time::Duration;

use kvferry_record::Record;

/// What to do with one record's TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlDecision {
    /// Transmit with this TTL; `None` defers to the destination default
    Send(Option<Duration>),

    /// Expired relative to now - skip transmission
    AlreadyExpired,
}

/// Per-run TTL rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtlPolicy {
    max_ttl: Option<Duration>,
    reset_expired_to_default: bool,
}

impl TtlPolicy {
    /// Policy with no clipping and no expiry reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip TTLs above `max_ttl` down to it before transmission.
    pub fn with_max_ttl(mut self, max_ttl: Option<Duration>) -> Self {
        self.max_ttl = max_ttl;
        self
    }

    /// Treat already-expired records as "use the destination default"
    /// instead of skipping them.
    ///
    /// Off for live migrations. An aging snapshot eventually expires
    /// entirely; turning this on keeps it loadable for testing.
    pub fn reset_expired_to_default(mut self, enabled: bool) -> Self {
        self.reset_expired_to_default = enabled;
        self
    }

    /// Decide the TTL for one record relative to the current wall clock.
    pub fn apply(&self, record: &Record) -> TtlDecision {
        self.decide(record.ttl_relative_to_now(), record.key())
    }

    fn decide(&self, ttl_ms: Option<i64>, key: &str) -> TtlDecision {
        let Some(ttl_ms) = ttl_ms else {
            // No expiry in the dump; the destination applies its default.
            return TtlDecision::Send(None);
        };

        if ttl_ms <= 0 {
            if self.reset_expired_to_default {
                return TtlDecision::Send(None);
            }
            return TtlDecision::AlreadyExpired;
        }

        let mut ttl = Duration::from_millis(ttl_ms as u64);
        if let Some(max_ttl) = self.max_ttl
            && ttl > max_ttl
        {
            tracing::debug!(
                key,
                ttl_ms,
                max_ttl_ms = max_ttl.as_millis() as u64,
                "clipping ttl to configured maximum"
            );
            ttl = max_ttl;
        }
        TtlDecision::Send(Some(ttl))
    }
}
