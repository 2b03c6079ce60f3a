//! KVFerry - Destination cache client
//!
//! The destination is a remote key-value cache with per-record-type write
//! and read operations. This crate owns the client seam: the [`CacheClient`]
//! trait the pipeline dispatches against, the enumerated response outcomes,
//! and two implementations:
//!
//! - [`HttpCacheClient`] - talks to the cache service's REST surface
//! - [`MemoryCache`] - in-process store for tests and no-network benchmarks
//!
//! # Outcomes
//!
//! Reads distinguish [`Fetched::Hit`] from [`Fetched::Miss`]; a miss is a
//! normal outcome, not an error. Likewise [`Deleted::Missed`]: deleting an
//! absent key succeeds. Only transport and backend failures surface as
//! [`CacheError`].

mod error;
mod http;
mod memory;

pub use error::CacheError;
pub use http::HttpCacheClient;
pub use memory::{MemoryCache, StoredValue};

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Outcome of a read: the stored value, or nothing there.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Key present; carries the stored value
    Hit(T),
    /// Key absent (never written, or expired out)
    Miss,
}

/// Outcome of a delete. Deleting an absent key is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    /// Key existed and was removed
    Deleted,
    /// Key was not present
    Missed,
}

/// Outcome of creating the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCreate {
    /// Cache did not exist and was created
    Created,
    /// Cache already existed; nothing to do
    AlreadyExists,
}

/// Client for one destination cache.
///
/// The cache name is bound at construction; all operations address keys
/// within it. Implementations must be safe to share across pipeline
/// workers (`Send + Sync`), and every call must be independent - the
/// pipeline fans calls out concurrently with no ordering between keys.
///
/// A `ttl` of `None` defers to the destination's default TTL.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Create the bound cache if it does not exist.
    async fn create_cache(&self) -> CacheResult<CacheCreate>;

    /// Store a string value.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Store dictionary fields in bulk.
    async fn set_fields(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Remove a key of any type.
    async fn delete(&self, key: &str) -> CacheResult<Deleted>;

    /// Append elements to a list in order, creating it if absent.
    async fn push_all(
        &self,
        key: &str,
        elements: &[String],
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Add members to a set in bulk.
    async fn add_elements(
        &self,
        key: &str,
        members: &HashSet<String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Add one scored member to a sorted set.
    ///
    /// The service has no bulk scored-add; callers fan out per member.
    async fn add_scored_member(&self, key: &str, member: &str, score: f64) -> CacheResult<()>;

    /// Read a string value.
    async fn get(&self, key: &str) -> CacheResult<Fetched<String>>;

    /// Read all dictionary fields.
    async fn fetch_fields(&self, key: &str) -> CacheResult<Fetched<HashMap<String, String>>>;

    /// Read a list, in stored order.
    async fn fetch_list(&self, key: &str) -> CacheResult<Fetched<Vec<String>>>;

    /// Read all set members.
    async fn fetch_set(&self, key: &str) -> CacheResult<Fetched<HashSet<String>>>;
}
