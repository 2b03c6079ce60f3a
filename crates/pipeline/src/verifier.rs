//! Read-back verification - compare source records against the destination
//!
//! Issues one read per record and checks structural equality: exact string
//! equality for strings, map equality ignoring field order for hashes,
//! ordered sequence equality for lists, set equality for sets.
//!
//! A destination miss is acceptable when the source record has
//! independently expired relative to now at verification time - legitimate
//! TTL-driven disappearance is not a false negative.

use std::sync::Arc;

use async_trait::async_trait;

use kvferry_cache::{CacheClient, CacheError, Fetched};
use kvferry_record::{Decoder, Reason, Record};

use crate::{LineOutcome, LineProcessor, failure};

/// Verify-mode pipeline pass: decode, read back, compare.
pub struct Verifier {
    client: Arc<dyn CacheClient>,
    decoder: Decoder,
}

impl Verifier {
    /// Verifier reading through `client`.
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self {
            client,
            decoder: Decoder::new(),
        }
    }

    async fn verify(&self, record: &Record, line: &str) -> LineOutcome {
        match record {
            Record::String { key, value, .. } => {
                let fetched = self.client.get(key).await;
                self.compare(record, "string", line, fetched, value)
            }
            Record::Hash { key, fields, .. } => {
                let fetched = self.client.fetch_fields(key).await;
                self.compare(record, "hash", line, fetched, fields)
            }
            Record::List { key, elements, .. } => {
                let fetched = self.client.fetch_list(key).await;
                self.compare(record, "list", line, fetched, elements)
            }
            Record::Set { key, members, .. } => {
                let fetched = self.client.fetch_set(key).await;
                self.compare(record, "set", line, fetched, members)
            }
            Record::SortedSet { key, .. } => {
                // The destination exposes no sorted-set fetch.
                tracing::error!(key, line, "unsupported_data_type");
                LineOutcome::Failed(failure::UNSUPPORTED_DATA_TYPE)
            }
        }
    }

    /// Shared hit/miss/error handling around one typed read.
    fn compare<T: PartialEq + std::fmt::Debug>(
        &self,
        record: &Record,
        type_tag: &'static str,
        line: &str,
        fetched: Result<Fetched<T>, CacheError>,
        expected: &T,
    ) -> LineOutcome {
        let key = record.key();
        match fetched {
            Ok(Fetched::Hit(actual)) => {
                if actual == *expected {
                    tracing::debug!(key, type_tag, "verified");
                    LineOutcome::Ok
                } else {
                    tracing::error!(key, type_tag, ?actual, ?expected, "value mismatch");
                    LineOutcome::Failed(failure::MISMATCH)
                }
            }
            Ok(Fetched::Miss) => {
                // Re-check expiry at miss time: the record may have aged out
                // between the pre-dispatch check and the read.
                if record.has_expired_relative_to_now() {
                    tracing::info!(key, type_tag, "miss for expired record");
                    LineOutcome::Filtered(Reason::AlreadyExpired)
                } else {
                    tracing::error!(key, type_tag, line, "miss");
                    LineOutcome::Failed(failure::MISSING)
                }
            }
            Err(e) => {
                tracing::error!(key, type_tag, error = %e, line, "error_getting");
                LineOutcome::Failed(failure::ERROR_GETTING)
            }
        }
    }
}

#[async_trait]
impl LineProcessor for Verifier {
    async fn process(&self, line: &str) -> LineOutcome {
        let record = match self.decoder.decode(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(reason = %e.reason(), line, "line rejected");
                return LineOutcome::Rejected(e.reason());
            }
        };

        if record.has_expired_relative_to_now() {
            tracing::info!(key = record.key(), line, "already_expired");
            return LineOutcome::Filtered(Reason::AlreadyExpired);
        }

        self.verify(&record, line).await
    }

    fn mode(&self) -> &'static str {
        "verify"
    }
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
