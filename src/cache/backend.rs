//! Cache Backend Module
//!
//! The key-value interface the gateway reads and writes through.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::CompositeKey;
use crate::error::CacheResult;

/// Shared key-value store with per-key expiry.
///
/// Implementations must make each individual call atomic for its key; the
/// gateway performs no locking of its own. Any failure should be reported as
/// `CacheError::Unavailable`.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &CompositeKey) -> CacheResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous entry, expiring
    /// after `ttl`.
    async fn set(&self, key: &CompositeKey, value: Value, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &CompositeKey) -> CacheResult<()>;

    /// Number of entries physically held, if the backend can tell.
    async fn entry_count(&self) -> Option<usize> {
        None
    }
}
