//! Per-record failure reasons
//!
//! The closed vocabulary shared by the codec, the validators and the run
//! stats. The `as_str()` tags are written to the error stream as
//! `reason\tline` and keyed into the per-reason histogram, so they are part
//! of the tool's output format.

use std::fmt;

/// Why a record was rejected or filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reason {
    /// Line is not valid JSON, or its shape does not match its type tag
    InvalidJson,

    /// The `type` tag is outside the supported set
    DataTypeNotSupported,

    /// Payload exceeds the configured size limit
    DataTooLarge,

    /// Expiry is in the past relative to processing time
    AlreadyExpired,

    /// TTL exceeds the configured maximum
    TtlTooLong,

    /// Record carries no expiry at all
    NoTtl,
}

impl Reason {
    /// Stable wire tag for this reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Reason::InvalidJson => "invalid_json",
            Reason::DataTypeNotSupported => "data_type_not_supported",
            Reason::DataTooLarge => "data_too_large",
            Reason::AlreadyExpired => "already_expired",
            Reason::TtlTooLong => "ttl_too_long",
            Reason::NoTtl => "no_ttl",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
