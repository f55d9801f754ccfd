//! In-Memory Backend Module
//!
//! HashMap storage with TTL expiration, shared behind a tokio `RwLock`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::{CacheBackend, CacheEntry, CompositeKey};
use crate::error::CacheResult;

// == Memory Store ==
/// Map of composite keys to entries. Expired entries are dropped on read or
/// by [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<CompositeKey, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry and resetting its TTL.
    pub fn set(&mut self, key: CompositeKey, value: Value, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Get ==
    /// Returns the live value for `key`. An expired entry is removed and
    /// reported as absent.
    pub fn get(&mut self, key: &CompositeKey) -> Option<Value> {
        let expired = self.entries.get(key)?.is_expired();
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    pub fn delete(&mut self, key: &CompositeKey) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Memory Backend ==
/// [`CacheBackend`] over a process-wide [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the underlying store, used by the cleanup task.
    pub fn store(&self) -> Arc<RwLock<MemoryStore>> {
        Arc::clone(&self.store)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &CompositeKey) -> CacheResult<Option<Value>> {
        // Write lock: an expired hit is reclaimed in place
        let mut store = self.store.write().await;
        Ok(store.get(key))
    }

    async fn set(&self, key: &CompositeKey, value: Value, ttl: Duration) -> CacheResult<()> {
        let mut store = self.store.write().await;
        store.set(key.clone(), value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &CompositeKey) -> CacheResult<()> {
        let mut store = self.store.write().await;
        store.delete(key);
        Ok(())
    }

    async fn entry_count(&self) -> Option<usize> {
        Some(self.store.read().await.len())
    }
}
