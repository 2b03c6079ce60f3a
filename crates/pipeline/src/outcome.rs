//! Per-line outcomes and the pipeline pass trait

use async_trait::async_trait;

use kvferry_record::Reason;

/// Dispatch failure tags recorded in the per-reason histogram and written
/// to the error stream. Stable output format, like [`Reason::as_str`].
pub mod failure {
    /// A destination write was rejected
    pub const ERROR_STORING: &str = "error_storing";
    /// The pre-write delete of a list was rejected
    pub const ERROR_DELETING: &str = "error_deleting";
    /// A destination read was rejected
    pub const ERROR_GETTING: &str = "error_getting";
    /// Verification found no value where one was expected
    pub const MISSING: &str = "missing";
    /// Verification found a value that differs from the source record
    pub const MISMATCH: &str = "value_mismatch";
    /// The record type has no dispatch in this mode
    pub const UNSUPPORTED_DATA_TYPE: &str = "unsupported_data_type";
}

/// Terminal classification of one input line.
///
/// Exactly one of these is produced per non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Dispatched, validated or verified successfully
    Ok,

    /// Skipped by policy (success-like, not an error)
    Filtered(Reason),

    /// Rejected before dispatch: parse or validation failure
    Rejected(Reason),

    /// Dispatch reached the destination and failed
    Failed(&'static str),
}

impl LineOutcome {
    /// The tag written to the error stream, if this outcome is an error.
    pub fn error_tag(&self) -> Option<&'static str> {
        match self {
            LineOutcome::Ok | LineOutcome::Filtered(_) => None,
            LineOutcome::Rejected(reason) => Some(reason.as_str()),
            LineOutcome::Failed(tag) => Some(tag),
        }
    }
}

/// One pipeline pass over one line.
///
/// Implementations are shared across workers and called concurrently;
/// each call owns its decoded record and shares no mutable state.
#[async_trait]
pub trait LineProcessor: Send + Sync {
    /// Run the pass and classify the line.
    async fn process(&self, line: &str) -> LineOutcome;

    /// Mode name for logging ("load", "validate", "verify").
    fn mode(&self) -> &'static str;
}
