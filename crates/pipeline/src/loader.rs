//! Write dispatch - one destination operation sequence per record type
//!
//! Maps a record's type tag onto the calls that store it, exhaustively.
//! Most variants are a single bulk write. Lists are the exception: the
//! destination's list operations are not idempotent, so the loader deletes
//! the key first and then concatenates, best-effort. Sorted sets fan out
//! per member because the destination has no bulk scored-add.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use kvferry_cache::CacheClient;
use kvferry_record::{Decoder, Reason, Record};

use crate::{LineOutcome, LineProcessor, TtlDecision, TtlPolicy, failure};

/// Load-mode pipeline pass: decode, apply the TTL policy, write.
pub struct Loader {
    client: Arc<dyn CacheClient>,
    decoder: Decoder,
    policy: TtlPolicy,
}

impl Loader {
    /// Loader writing through `client` under `policy`.
    pub fn new(client: Arc<dyn CacheClient>, policy: TtlPolicy) -> Self {
        Self {
            client,
            decoder: Decoder::new(),
            policy,
        }
    }

    /// Replace the decoder (to restrict the accepted tag set).
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    async fn dispatch(&self, record: &Record, ttl: Option<Duration>, line: &str) -> LineOutcome {
        let result = match record {
            Record::String { key, value, .. } => self.client.set(key, value, ttl).await,
            Record::Hash { key, fields, .. } => self.client.set_fields(key, fields, ttl).await,
            Record::List { key, elements, .. } => {
                return self.load_list(key, elements, ttl, line).await;
            }
            Record::Set { key, members, .. } => self.client.add_elements(key, members, ttl).await,
            Record::SortedSet { key, members, .. } => {
                return self.load_sorted_set(key, members, line).await;
            }
        };

        match result {
            Ok(()) => LineOutcome::Ok,
            Err(e) => {
                tracing::error!(key = record.key(), error = %e, line, "error_storing");
                LineOutcome::Failed(failure::ERROR_STORING)
            }
        }
    }

    /// List writes are not idempotent at the destination: clear the key,
    /// then concatenate. A delete miss means the key simply wasn't there.
    /// On a delete backend error the concatenate is still attempted, but
    /// the record counts as failed.
    async fn load_list(
        &self,
        key: &str,
        elements: &[String],
        ttl: Option<Duration>,
        line: &str,
    ) -> LineOutcome {
        let mut failed = None;

        if let Err(e) = self.client.delete(key).await {
            tracing::error!(key, error = %e, line, "error_deleting");
            failed = Some(failure::ERROR_DELETING);
        }

        if let Err(e) = self.client.push_all(key, elements, ttl).await {
            tracing::error!(key, error = %e, line, "error_storing");
            failed = Some(failure::ERROR_STORING);
        }

        match failed {
            None => LineOutcome::Ok,
            Some(tag) => LineOutcome::Failed(tag),
        }
    }

    /// One scored-add per member. A failed member marks the record failed;
    /// the remaining members are still sent.
    async fn load_sorted_set(
        &self,
        key: &str,
        members: &HashMap<String, f64>,
        line: &str,
    ) -> LineOutcome {
        let mut failed = false;

        for (member, score) in members {
            if let Err(e) = self.client.add_scored_member(key, member, *score).await {
                tracing::error!(key, member = %member, error = %e, line, "error_storing");
                failed = true;
            }
        }

        if failed {
            LineOutcome::Failed(failure::ERROR_STORING)
        } else {
            LineOutcome::Ok
        }
    }
}

#[async_trait]
impl LineProcessor for Loader {
    async fn process(&self, line: &str) -> LineOutcome {
        let record = match self.decoder.decode(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(reason = %e.reason(), line, "line rejected");
                return LineOutcome::Rejected(e.reason());
            }
        };

        let ttl = match self.policy.apply(&record) {
            TtlDecision::Send(ttl) => ttl,
            TtlDecision::AlreadyExpired => {
                tracing::info!(key = record.key(), line, "already_expired");
                return LineOutcome::Filtered(Reason::AlreadyExpired);
            }
        };

        self.dispatch(&record, ttl, line).await
    }

    fn mode(&self) -> &'static str {
        "load"
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
