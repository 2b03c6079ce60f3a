//! Test support: a cache wrapper that records calls and injects failures

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use kvferry_cache::{
    CacheClient, CacheCreate, CacheError, CacheResult, Deleted, Fetched, MemoryCache,
};

/// Delegates to a [`MemoryCache`], logging every call and failing the
/// operations tests ask it to fail.
#[derive(Default)]
pub struct RecordingCache {
    pub inner: MemoryCache,
    calls: Mutex<Vec<String>>,
    fail_deletes: Mutex<HashSet<String>>,
    fail_writes: Mutex<HashSet<String>>,
    fail_reads: Mutex<HashSet<String>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes_of(self, key: &str) -> Self {
        self.fail_deletes.lock().insert(key.to_string());
        self
    }

    pub fn fail_writes_of(self, key: &str) -> Self {
        self.fail_writes.lock().insert(key.to_string());
        self
    }

    pub fn fail_reads_of(self, key: &str) -> Self {
        self.fail_reads.lock().insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn log(&self, op: &str, key: &str) {
        self.calls.lock().push(format!("{op} {key}"));
    }

    fn injected() -> CacheError {
        CacheError::backend(500, "injected failure")
    }

    fn check(&self, set: &Mutex<HashSet<String>>, key: &str) -> CacheResult<()> {
        if set.lock().contains(key) {
            Err(Self::injected())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheClient for RecordingCache {
    async fn create_cache(&self) -> CacheResult<CacheCreate> {
        self.log("create_cache", "-");
        self.inner.create_cache().await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.log("set", key);
        self.check(&self.fail_writes, key)?;
        self.inner.set(key, value, ttl).await
    }

    async fn set_fields(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        self.log("set_fields", key);
        self.check(&self.fail_writes, key)?;
        self.inner.set_fields(key, fields, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<Deleted> {
        self.log("delete", key);
        self.check(&self.fail_deletes, key)?;
        self.inner.delete(key).await
    }

    async fn push_all(
        &self,
        key: &str,
        elements: &[String],
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        self.log("push_all", key);
        self.check(&self.fail_writes, key)?;
        self.inner.push_all(key, elements, ttl).await
    }

    async fn add_elements(
        &self,
        key: &str,
        members: &HashSet<String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        self.log("add_elements", key);
        self.check(&self.fail_writes, key)?;
        self.inner.add_elements(key, members, ttl).await
    }

    async fn add_scored_member(&self, key: &str, member: &str, score: f64) -> CacheResult<()> {
        self.log("add_scored_member", key);
        self.check(&self.fail_writes, key)?;
        self.inner.add_scored_member(key, member, score).await
    }

    async fn get(&self, key: &str) -> CacheResult<Fetched<String>> {
        self.log("get", key);
        self.check(&self.fail_reads, key)?;
        self.inner.get(key).await
    }

    async fn fetch_fields(&self, key: &str) -> CacheResult<Fetched<HashMap<String, String>>> {
        self.log("fetch_fields", key);
        self.check(&self.fail_reads, key)?;
        self.inner.fetch_fields(key).await
    }

    async fn fetch_list(&self, key: &str) -> CacheResult<Fetched<Vec<String>>> {
        self.log("fetch_list", key);
        self.check(&self.fail_reads, key)?;
        self.inner.fetch_list(key).await
    }

    async fn fetch_set(&self, key: &str) -> CacheResult<Fetched<HashSet<String>>> {
        self.log("fetch_set", key);
        self.check(&self.fail_reads, key)?;
        self.inner.fetch_set(key).await
    }
}
