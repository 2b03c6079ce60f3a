//! Typed record model and TTL arithmetic
//!
//! One [`Record`] is one decoded dump line: a single source key, its typed
//! value, and an optional absolute expiry in epoch milliseconds.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed on-the-wire cost of the expiry slot. The destination requires an
/// expiry even where the source store does not, so every record pays it.
const EXPIRY_SLOT_BYTES: usize = 8;

/// On-the-wire cost of one sorted-set score (a 64-bit double).
const SCORE_BYTES: usize = 8;

/// Current wall clock as epoch milliseconds.
pub fn epoch_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// One decoded dump record.
///
/// The variant set is closed and discriminated by the wire `type` tag.
/// Consumers match exhaustively; unknown tags never reach this type (the
/// decoder rejects them with their raw tag preserved).
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// `type: "string"` - a single string value
    String {
        key: String,
        expiry: Option<i64>,
        value: String,
    },

    /// `type: "hash"` - field/value mapping with unique fields
    Hash {
        key: String,
        expiry: Option<i64>,
        fields: HashMap<String, String>,
    },

    /// `type: "list"` - ordered sequence; duplicates and order significant
    List {
        key: String,
        expiry: Option<i64>,
        elements: Vec<String>,
    },

    /// `type: "set"` - unordered unique members
    Set {
        key: String,
        expiry: Option<i64>,
        members: HashSet<String>,
    },

    /// `type: "sortedset"` - member to score mapping
    SortedSet {
        key: String,
        expiry: Option<i64>,
        members: HashMap<String, f64>,
    },
}

impl Record {
    /// The source key this record belongs to.
    pub fn key(&self) -> &str {
        match self {
            Record::String { key, .. }
            | Record::Hash { key, .. }
            | Record::List { key, .. }
            | Record::Set { key, .. }
            | Record::SortedSet { key, .. } => key,
        }
    }

    /// Absolute expiry in epoch milliseconds, if the record carries one.
    pub fn expiry(&self) -> Option<i64> {
        match self {
            Record::String { expiry, .. }
            | Record::Hash { expiry, .. }
            | Record::List { expiry, .. }
            | Record::Set { expiry, .. }
            | Record::SortedSet { expiry, .. } => *expiry,
        }
    }

    /// Wire tag for this variant, for logging.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Record::String { .. } => "string",
            Record::Hash { .. } => "hash",
            Record::List { .. } => "list",
            Record::Set { .. } => "set",
            Record::SortedSet { .. } => "sortedset",
        }
    }

    /// Remaining TTL in milliseconds relative to `now_ms`.
    ///
    /// Negative or zero means the record has already expired at `now_ms`.
    /// `None` means the record never expires.
    pub fn ttl_relative_to(&self, now_ms: i64) -> Option<i64> {
        self.expiry().map(|expiry| expiry - now_ms)
    }

    /// Remaining TTL in milliseconds relative to the current wall clock.
    pub fn ttl_relative_to_now(&self) -> Option<i64> {
        self.ttl_relative_to(epoch_millis_now())
    }

    /// Whether a TTL computed by [`Record::ttl_relative_to`] is expired.
    ///
    /// Absent TTL never expires; zero counts as expired.
    pub fn has_expired(ttl_ms: Option<i64>) -> bool {
        matches!(ttl_ms, Some(ttl) if ttl <= 0)
    }

    /// Whether this record has expired relative to the current wall clock.
    pub fn has_expired_relative_to_now(&self) -> bool {
        Self::has_expired(self.ttl_relative_to_now())
    }

    /// Approximate on-the-wire size of this record in bytes.
    ///
    /// UTF-8 byte length of the key plus the fixed expiry slot plus the
    /// variant's value contribution. Additive over entries, so permuting
    /// hash fields or set members never changes the result.
    pub fn payload_size_in_bytes(&self) -> usize {
        let base = self.key().len() + EXPIRY_SLOT_BYTES;
        let value = match self {
            Record::String { value, .. } => value.len(),
            Record::Hash { fields, .. } => {
                fields.iter().map(|(f, v)| f.len() + v.len()).sum()
            }
            Record::List { elements, .. } => elements.iter().map(String::len).sum(),
            Record::Set { members, .. } => members.iter().map(String::len).sum(),
            Record::SortedSet { members, .. } => {
                members.keys().map(|m| m.len() + SCORE_BYTES).sum()
            }
        };
        base + value
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
