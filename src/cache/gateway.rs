//! Cache Gateway Module
//!
//! Read-through access to cached aggregates with prefix-scoped invalidation.
//!
//! A lookup that finds a live entry returns it without running the fetch
//! function. Anything else (absent, expired, unreadable, undecodable) runs the
//! fetch and stores its result. Cache infrastructure failures only ever cost
//! an extra fetch: reads fail open and write failures are logged.
//!
//! Invalidation does not fence fetches already running. A miss whose fetch
//! read the ledger before a write, and stores after that write's
//! `invalidate_all`, leaves the pre-write value in the cache for its full ttl.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{
    CacheBackend, CachePrefix, CacheStats, CompositeKey, InflightRegistry, StatsRecorder,
};
use crate::error::{CacheError, CacheResult};

// == Cache Gateway ==
/// Shared handle used by request handlers. Cloning is cheap.
#[derive(Clone)]
pub struct CacheGateway {
    backend: Arc<dyn CacheBackend>,
    stats: Arc<StatsRecorder>,
    inflight: Option<Arc<InflightRegistry>>,
}

impl CacheGateway {
    // == Constructor ==
    /// Creates a gateway over `backend` without miss coalescing.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            stats: Arc::new(StatsRecorder::new()),
            inflight: None,
        }
    }

    /// Enables or disables sharing one fetch between concurrent misses on the
    /// same composite key.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.inflight = enabled.then(|| Arc::new(InflightRegistry::new()));
        self
    }

    // == Get ==
    /// Returns the cached value for `(prefix, key)`, or runs `fetch`, caches
    /// its result for `ttl` and returns it.
    ///
    /// Errors from `fetch` are returned unchanged and never cached. An invalid
    /// key or a zero `ttl` is reported as a [`CacheError`] converted into `E`
    /// before the store is touched.
    pub async fn get<V, E, F, Fut>(
        &self,
        key: &str,
        prefix: &CachePrefix,
        ttl: Duration,
        fetch: F,
    ) -> Result<V, E>
    where
        V: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let composite = CompositeKey::new(prefix, key)?;
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl.into());
        }

        if let Some(value) = self.lookup(&composite).await {
            self.stats.record_hit();
            debug!(key = %composite, "cache hit");
            return Ok(value);
        }

        // Held until the fetched value is stored
        let _inflight = match &self.inflight {
            Some(registry) => {
                let guard = registry.acquire(&composite).await;
                // Another request may have filled the entry while we waited
                if let Some(value) = self.lookup(&composite).await {
                    self.stats.record_hit();
                    debug!(key = %composite, "cache hit after coalesced wait");
                    return Ok(value);
                }
                Some(guard)
            }
            None => None,
        };

        self.stats.record_miss();
        debug!(key = %composite, "cache miss, fetching");

        let value = match fetch().await {
            Ok(value) => value,
            Err(err) => {
                self.stats.record_fetch_failure();
                debug!(key = %composite, "fetch failed, nothing cached");
                return Err(err);
            }
        };

        self.store(&composite, &value, ttl).await;
        Ok(value)
    }

    // == Invalidate ==
    /// Deletes the entry for `(prefix, key)`. Deleting an absent entry
    /// succeeds.
    pub async fn invalidate(&self, key: &str, prefix: &CachePrefix) -> CacheResult<()> {
        let composite = CompositeKey::new(prefix, key)?;
        match self.backend.delete(&composite).await {
            Ok(()) => {
                self.stats.record_invalidation();
                debug!(key = %composite, "cache entry invalidated");
                Ok(())
            }
            Err(err) => {
                self.stats.record_store_error();
                Err(err)
            }
        }
    }

    /// Invalidates `key` under every prefix in `prefixes`.
    ///
    /// Every prefix is attempted even if an earlier one fails. Failures are
    /// logged, never returned; the count of failed prefixes is returned.
    /// The deletes are independent, so a failure can leave one aggregate
    /// stale until its ttl runs out.
    ///
    /// Fetches started before the write are not cancelled: one that stores
    /// after this call puts back the value it read before the write, and
    /// that value is served for its full ttl.
    pub async fn invalidate_all(&self, key: &str, prefixes: &[CachePrefix]) -> usize {
        let mut failures = 0;
        for prefix in prefixes {
            if let Err(err) = self.invalidate(key, prefix).await {
                failures += 1;
                warn!(
                    prefix = %prefix,
                    key = %key,
                    error = %err,
                    "cache invalidation failed, stale entry may be served until expiry"
                );
            }
        }
        failures
    }

    // == Stats ==
    /// Returns a snapshot of the gateway counters.
    pub async fn stats(&self) -> CacheStats {
        let in_flight = self.inflight.as_ref().map(|registry| registry.in_flight());
        self.stats
            .snapshot(self.backend.entry_count().await, in_flight)
    }

    /// Reads and decodes a live entry. Any failure is treated as a miss.
    async fn lookup<V: DeserializeOwned>(&self, key: &CompositeKey) -> Option<V> {
        let raw = match self.backend.get(key).await {
            Ok(raw) => raw?,
            Err(err) => {
                self.stats.record_store_error();
                warn!(key = %key, error = %err, "cache read failed, falling back to fetch");
                return None;
            }
        };

        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "cached value could not be decoded, refetching");
                None
            }
        }
    }

    /// Writes a fetched value. Failures are logged; the caller still gets
    /// the value.
    async fn store<V: Serialize>(&self, key: &CompositeKey, value: &V, ttl: Duration) {
        let raw = match serde_json::to_value(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key, error = %err, "fetched value is not serializable, not cached");
                return;
            }
        };

        if let Err(err) = self.backend.set(key, raw, ttl).await {
            self.stats.record_store_error();
            warn!(key = %key, error = %err, "cache write failed, returning uncached value");
        }
    }
}

impl std::fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheGateway")
            .field("coalescing", &self.inflight.is_some())
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Balance {
        total_balance: f64,
    }

    #[derive(Debug, PartialEq)]
    enum TestError {
        Fetch(&'static str),
        Cache(CacheError),
    }

    impl From<CacheError> for TestError {
        fn from(err: CacheError) -> Self {
            TestError::Cache(err)
        }
    }

    /// Backend whose reads, writes and deletes can be switched to fail.
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryBackend,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        fail_deletes: AtomicBool,
    }

    #[async_trait]
    impl CacheBackend for FlakyBackend {
        async fn get(&self, key: &CompositeKey) -> CacheResult<Option<Value>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("read refused".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &CompositeKey, value: Value, ttl: Duration) -> CacheResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("write refused".to_string()));
            }
            self.inner.set(key, value, ttl).await
        }

        async fn delete(&self, key: &CompositeKey) -> CacheResult<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(CacheError::Unavailable("delete refused".to_string()));
            }
            self.inner.delete(key).await
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    fn gateway() -> CacheGateway {
        CacheGateway::new(Arc::new(MemoryBackend::new()))
    }

    async fn counted_get(
        gateway: &CacheGateway,
        calls: &AtomicUsize,
        prefix: &CachePrefix,
        total: f64,
    ) -> Result<Balance, TestError> {
        gateway
            .get("u1", prefix, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Balance {
                    total_balance: total,
                })
            })
            .await
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);

        let first = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 500.0).await;
        let second = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 999.0).await;

        assert_eq!(first.unwrap().total_balance, 500.0);
        assert_eq!(second.unwrap().total_balance, 500.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = gateway.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, Some(1));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);

        counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 500.0)
            .await
            .unwrap();
        gateway
            .invalidate("u1", &CachePrefix::TOTAL_BALANCE)
            .await
            .unwrap();
        let after = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 800.0)
            .await
            .unwrap();

        assert_eq!(after.total_balance, 800.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_absent_is_ok() {
        let gateway = gateway();
        assert!(gateway
            .invalidate("nobody", &CachePrefix::ACCOUNTS)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_is_not_cached() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);

        let result: Result<Balance, TestError> = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fetch("database unavailable"))
            })
            .await;
        assert_eq!(result, Err(TestError::Fetch("database unavailable")));

        counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 1.0)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.stats().await.fetch_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_triggers_refetch() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(2);

        let fetch = |total: f64| {
            let calls = &calls;
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(Balance {
                    total_balance: total,
                })
            }
        };

        let t0 = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, ttl, fetch(1.0))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let t1 = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, ttl, fetch(2.0))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        let t3 = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, ttl, fetch(3.0))
            .await
            .unwrap();

        assert_eq!(t0.total_balance, 1.0);
        assert_eq!(t1.total_balance, 1.0);
        assert_eq!(t3.total_balance, 3.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_prefixes_are_independent() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);

        counted_get(&gateway, &calls, &CachePrefix::ACCOUNTS, 1.0)
            .await
            .unwrap();
        counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 2.0)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        gateway
            .invalidate("u1", &CachePrefix::ACCOUNTS)
            .await
            .unwrap();

        let balance = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 9.0)
            .await
            .unwrap();
        assert_eq!(balance.total_balance, 2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected_before_fetch() {
        let gateway = gateway();
        let calls = AtomicUsize::new(0);

        let empty_key: Result<Balance, TestError> = gateway
            .get("", &CachePrefix::ACCOUNTS, TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Balance { total_balance: 0.0 })
            })
            .await;
        assert!(matches!(
            empty_key,
            Err(TestError::Cache(CacheError::InvalidKey(_)))
        ));

        let zero_ttl: Result<Balance, TestError> = gateway
            .get("u1", &CachePrefix::ACCOUNTS, Duration::ZERO, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Balance { total_balance: 0.0 })
            })
            .await;
        assert_eq!(zero_ttl, Err(TestError::Cache(CacheError::InvalidTtl)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_read_failure_fails_open() {
        let backend = Arc::new(FlakyBackend::default());
        let gateway = CacheGateway::new(backend.clone());
        let calls = AtomicUsize::new(0);

        counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 1.0)
            .await
            .unwrap();
        backend.fail_reads.store(true, Ordering::SeqCst);

        let value = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 2.0)
            .await
            .unwrap();
        assert_eq!(value.total_balance, 2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(gateway.stats().await.store_errors, 1);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_value() {
        let backend = Arc::new(FlakyBackend::default());
        backend.fail_writes.store(true, Ordering::SeqCst);
        let gateway = CacheGateway::new(backend.clone());
        let calls = AtomicUsize::new(0);

        let value = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 7.0)
            .await
            .unwrap();
        assert_eq!(value.total_balance, 7.0);

        // Nothing was stored, so the next call fetches again
        counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 7.0)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_refetched() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = CacheGateway::new(backend.clone());
        let composite = CompositeKey::new(&CachePrefix::TOTAL_BALANCE, "u1").unwrap();
        backend
            .set(&composite, json!("not a balance"), TTL)
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 3.0)
            .await
            .unwrap();
        assert_eq!(value.total_balance, 3.0);
        assert_eq!(
            backend.get(&composite).await.unwrap(),
            Some(json!({"totalBalance": 3.0}))
        );
    }

    #[tokio::test]
    async fn test_invalidate_all_continues_after_failure() {
        let backend = Arc::new(FlakyBackend::default());
        let gateway = CacheGateway::new(backend.clone());
        let calls = AtomicUsize::new(0);
        counted_get(&gateway, &calls, &CachePrefix::ACCOUNTS, 1.0)
            .await
            .unwrap();

        backend.fail_deletes.store(true, Ordering::SeqCst);
        let failures = gateway
            .invalidate_all("u1", &[CachePrefix::ACCOUNTS, CachePrefix::TOTAL_BALANCE])
            .await;
        assert_eq!(failures, 2);

        backend.fail_deletes.store(false, Ordering::SeqCst);
        let failures = gateway
            .invalidate_all("u1", &[CachePrefix::ACCOUNTS, CachePrefix::TOTAL_BALANCE])
            .await;
        assert_eq!(failures, 0);
        assert_eq!(gateway.stats().await.invalidations, 2);
    }

    #[tokio::test]
    async fn test_coalescing_shares_one_fetch() {
        let gateway = gateway().with_coalescing(true);
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let gateway = gateway.clone();
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    gateway
                        .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok::<_, TestError>(Balance {
                                total_balance: 42.0,
                            })
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().total_balance, 42.0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_coalescing_failure_lets_next_waiter_fetch() {
        let gateway = gateway().with_coalescing(true);

        let failed: Result<Balance, TestError> = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async {
                Err(TestError::Fetch("boom"))
            })
            .await;
        assert!(failed.is_err());

        let ok: Result<Balance, TestError> = gateway
            .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async {
                Ok(Balance { total_balance: 5.0 })
            })
            .await;
        assert_eq!(ok.unwrap().total_balance, 5.0);
    }

    #[tokio::test]
    async fn test_stats_report_in_flight_keys() {
        assert_eq!(gateway().stats().await.in_flight, None);

        let gateway = gateway().with_coalescing(true);
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let pending = {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                gateway
                    .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async move {
                        let _ = wait.await;
                        Ok::<_, TestError>(Balance { total_balance: 1.0 })
                    })
                    .await
            })
        };

        for _ in 0..100 {
            if gateway.stats().await.in_flight == Some(1) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(gateway.stats().await.in_flight, Some(1));

        release.send(()).unwrap();
        pending.await.unwrap().unwrap();
        assert_eq!(gateway.stats().await.in_flight, Some(0));
    }

    #[tokio::test]
    async fn test_fetch_spanning_invalidation_stores_pre_write_value() {
        let gateway = gateway();
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let slow = {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                gateway
                    .get("u1", &CachePrefix::TOTAL_BALANCE, TTL, || async move {
                        // Read before the write below lands
                        let read = Balance {
                            total_balance: 500.0,
                        };
                        let _ = wait.await;
                        Ok::<_, TestError>(read)
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        gateway
            .invalidate_all("u1", &[CachePrefix::TOTAL_BALANCE])
            .await;
        release.send(()).unwrap();
        slow.await.unwrap().unwrap();

        // The stale value is now served without a fetch until the ttl runs out
        let calls = AtomicUsize::new(0);
        let served = counted_get(&gateway, &calls, &CachePrefix::TOTAL_BALANCE, 800.0)
            .await
            .unwrap();
        assert_eq!(served.total_balance, 500.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
