//! In-memory implementation of the cache client
//!
//! Implements the full client trait against a process-local map. Used by
//! the pipeline tests and as a no-network destination for benchmarking the
//! pipeline itself (decode, policy, dispatch) without a service.
//!
//! TTLs are recorded, not enforced: entries never expire out of the map,
//! so tests can assert on the TTL a dispatch actually sent.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{CacheClient, CacheCreate, CacheError, CacheResult, Deleted, Fetched};

/// What one key currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    String(String),
    Dictionary(HashMap<String, String>),
    List(Vec<String>),
    Set(HashSet<String>),
    SortedSet(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: StoredValue,
    ttl: Option<Duration>,
}

/// In-process cache store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    created: AtomicBool,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the value stored at `key`, if any.
    pub fn stored(&self, key: &str) -> Option<StoredValue> {
        self.entries.read().get(key).map(|e| e.value.clone())
    }

    /// TTL recorded for `key`, if the key exists.
    pub fn ttl_of(&self, key: &str) -> Option<Option<Duration>> {
        self.entries.read().get(key).map(|e| e.ttl)
    }

    fn type_mismatch(key: &str, expected: &str) -> CacheError {
        CacheError::backend(409, format!("key {key:?} holds a non-{expected} value"))
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn create_cache(&self) -> CacheResult<CacheCreate> {
        if self.created.swap(true, Ordering::SeqCst) {
            Ok(CacheCreate::AlreadyExists)
        } else {
            Ok(CacheCreate::Created)
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.entries.write().insert(
            key.to_string(),
            Entry {
                value: StoredValue::String(value.to_string()),
                ttl,
            },
        );
        Ok(())
    }

    async fn set_fields(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(Entry {
                value: StoredValue::Dictionary(existing),
                ttl: entry_ttl,
            }) => {
                existing.extend(fields.iter().map(|(f, v)| (f.clone(), v.clone())));
                *entry_ttl = ttl;
            }
            Some(_) | None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: StoredValue::Dictionary(fields.clone()),
                        ttl,
                    },
                );
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<Deleted> {
        if self.entries.write().remove(key).is_some() {
            Ok(Deleted::Deleted)
        } else {
            Ok(Deleted::Missed)
        }
    }

    async fn push_all(
        &self,
        key: &str,
        elements: &[String],
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(Entry {
                value: StoredValue::List(existing),
                ttl: entry_ttl,
            }) => {
                existing.extend_from_slice(elements);
                *entry_ttl = ttl;
            }
            Some(_) | None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: StoredValue::List(elements.to_vec()),
                        ttl,
                    },
                );
            }
        }
        Ok(())
    }

    async fn add_elements(
        &self,
        key: &str,
        members: &HashSet<String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(Entry {
                value: StoredValue::Set(existing),
                ttl: entry_ttl,
            }) => {
                existing.extend(members.iter().cloned());
                *entry_ttl = ttl;
            }
            Some(_) | None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: StoredValue::Set(members.clone()),
                        ttl,
                    },
                );
            }
        }
        Ok(())
    }

    async fn add_scored_member(&self, key: &str, member: &str, score: f64) -> CacheResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(Entry {
                value: StoredValue::SortedSet(existing),
                ..
            }) => {
                existing.insert(member.to_string(), score);
            }
            Some(_) | None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: StoredValue::SortedSet(HashMap::from([(
                            member.to_string(),
                            score,
                        )])),
                        ttl: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Fetched<String>> {
        match self.entries.read().get(key) {
            None => Ok(Fetched::Miss),
            Some(Entry {
                value: StoredValue::String(value),
                ..
            }) => Ok(Fetched::Hit(value.clone())),
            Some(_) => Err(Self::type_mismatch(key, "string")),
        }
    }

    async fn fetch_fields(&self, key: &str) -> CacheResult<Fetched<HashMap<String, String>>> {
        match self.entries.read().get(key) {
            None => Ok(Fetched::Miss),
            Some(Entry {
                value: StoredValue::Dictionary(fields),
                ..
            }) => Ok(Fetched::Hit(fields.clone())),
            Some(_) => Err(Self::type_mismatch(key, "dictionary")),
        }
    }

    async fn fetch_list(&self, key: &str) -> CacheResult<Fetched<Vec<String>>> {
        match self.entries.read().get(key) {
            None => Ok(Fetched::Miss),
            Some(Entry {
                value: StoredValue::List(elements),
                ..
            }) => Ok(Fetched::Hit(elements.clone())),
            Some(_) => Err(Self::type_mismatch(key, "list")),
        }
    }

    async fn fetch_set(&self, key: &str) -> CacheResult<Fetched<HashSet<String>>> {
        match self.entries.read().get(key) {
            None => Ok(Fetched::Miss),
            Some(Entry {
                value: StoredValue::Set(members),
                ..
            }) => Ok(Fetched::Hit(members.clone())),
            Some(_) => Err(Self::type_mismatch(key, "set")),
        }
    }
}
