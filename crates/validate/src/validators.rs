//! Standard validators
//!
//! One rule per type, each independently instantiable. A run enables a
//! subset of these based on its policy flags.

use kvferry_record::{Reason, Record};

use crate::{ValidationOutcome, Validator};

/// Rejects records whose on-the-wire size exceeds the maximum.
///
/// The boundary is inclusive: a record exactly at the limit passes.
pub struct PayloadSize {
    max_bytes: usize,
}

impl PayloadSize {
    /// Limit expressed in MiB, the unit the policy flags use.
    pub fn from_mib(max_mib: usize) -> Self {
        Self {
            max_bytes: max_mib * 1024 * 1024,
        }
    }

    /// Limit expressed in bytes.
    pub fn from_bytes(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl Validator for PayloadSize {
    fn validate(&self, record: &Record) -> ValidationOutcome {
        if record.payload_size_in_bytes() <= self.max_bytes {
            ValidationOutcome::Ok
        } else {
            ValidationOutcome::Rejected(Reason::DataTooLarge)
        }
    }

    fn name(&self) -> &'static str {
        "payload_size"
    }
}

/// Rejects records whose remaining TTL exceeds the maximum.
///
/// Records without a TTL pass; the boundary is inclusive.
pub struct TtlInRange {
    max_ttl_ms: i64,
}

impl TtlInRange {
    /// Limit expressed in whole days, the unit the policy flags use.
    pub fn from_days(max_days: i64) -> Self {
        Self {
            max_ttl_ms: max_days * 24 * 60 * 60 * 1000,
        }
    }

    /// Limit expressed in milliseconds.
    pub fn from_millis(max_ttl_ms: i64) -> Self {
        Self { max_ttl_ms }
    }

    fn exceeds(&self, ttl_ms: Option<i64>) -> bool {
        matches!(ttl_ms, Some(ttl) if ttl > self.max_ttl_ms)
    }
}

impl Validator for TtlInRange {
    fn validate(&self, record: &Record) -> ValidationOutcome {
        if self.exceeds(record.ttl_relative_to_now()) {
            ValidationOutcome::Rejected(Reason::TtlTooLong)
        } else {
            ValidationOutcome::Ok
        }
    }

    fn name(&self) -> &'static str {
        "ttl_in_range"
    }
}

/// Rejects records that have already expired relative to now.
///
/// Records without a TTL pass.
pub struct HasntAlreadyExpired;

impl Validator for HasntAlreadyExpired {
    fn validate(&self, record: &Record) -> ValidationOutcome {
        if record.has_expired_relative_to_now() {
            ValidationOutcome::Rejected(Reason::AlreadyExpired)
        } else {
            ValidationOutcome::Ok
        }
    }

    fn name(&self) -> &'static str {
        "hasnt_already_expired"
    }
}

/// Rejects records that carry no expiry at all.
pub struct HasTtl;

impl Validator for HasTtl {
    fn validate(&self, record: &Record) -> ValidationOutcome {
        if record.expiry().is_some() {
            ValidationOutcome::Ok
        } else {
            ValidationOutcome::Rejected(Reason::NoTtl)
        }
    }

    fn name(&self) -> &'static str {
        "has_ttl"
    }
}

#[cfg(test)]
#[path = "validators_test.rs"]
mod tests;
