//! In-Flight Registry
//!
//! Per-key locks that let concurrent misses on one composite key share a
//! single fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::cache::CompositeKey;

type KeyLock = Arc<AsyncMutex<()>>;

/// Map from composite key to the lock held by whichever request is
/// currently fetching it.
#[derive(Debug, Default)]
pub struct InflightRegistry {
    locks: Mutex<HashMap<CompositeKey, KeyLock>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other request holds `key`, then holds it until the
    /// returned guard is dropped.
    pub async fn acquire(&self, key: &CompositeKey) -> InflightGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let permit = Arc::clone(&lock).lock_owned().await;

        InflightGuard {
            registry: self,
            key: key.clone(),
            lock,
            permit: Some(permit),
        }
    }

    /// Number of keys with a fetch in progress or queued.
    pub fn in_flight(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Holds a key in the registry. The map slot is released by the last holder.
pub struct InflightGuard<'a> {
    registry: &'a InflightRegistry,
    key: CompositeKey,
    lock: KeyLock,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        // Release the permit before inspecting the refcount so queued
        // waiters can proceed
        drop(self.permit.take());

        let mut locks = self
            .registry
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}
