//! Offline validation pass - decode plus validator chain, no network
//!
//! Used by validate mode to screen a dump before a live migration: valid
//! lines are echoed to the valid stream for loading, rejected lines go to
//! the error stream with their reason.

use async_trait::async_trait;

use kvferry_record::Decoder;
use kvferry_validate::{ValidationOutcome, Validator, ValidatorChain};

use crate::{LineOutcome, LineProcessor};

/// Validate-mode pipeline pass.
pub struct RecordChecker {
    decoder: Decoder,
    chain: ValidatorChain,
}

impl RecordChecker {
    /// Checker running `chain` over each decoded record.
    pub fn new(chain: ValidatorChain) -> Self {
        Self {
            decoder: Decoder::new(),
            chain,
        }
    }
}

#[async_trait]
impl LineProcessor for RecordChecker {
    async fn process(&self, line: &str) -> LineOutcome {
        let record = match self.decoder.decode(line) {
            Ok(record) => record,
            Err(e) => return LineOutcome::Rejected(e.reason()),
        };

        match self.chain.validate(&record) {
            ValidationOutcome::Ok => LineOutcome::Ok,
            ValidationOutcome::Rejected(reason) => LineOutcome::Rejected(reason),
        }
    }

    fn mode(&self) -> &'static str {
        "validate"
    }
}
