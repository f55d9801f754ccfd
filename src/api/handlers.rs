//! API Handlers
//!
//! Shared application state plus the health and cache statistics endpoints.
//! Resource handlers live in `accounts`, `transactions`, `savings` and
//! `dashboard`.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};

use crate::auth::{Authenticator, StaticTokenAuthenticator};
use crate::cache::{CacheGateway, MemoryBackend};
use crate::config::Config;
use crate::ledger::{LedgerStore, MemoryLedger};
use crate::models::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-through cache for per-user aggregates
    pub cache: CacheGateway,
    /// Account, transaction and savings storage
    pub ledger: Arc<dyn LedgerStore>,
    /// Bearer token resolution
    pub auth: Arc<dyn Authenticator>,
    /// Lifetime of cached aggregates
    pub cache_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState from its collaborators.
    pub fn new(
        cache: CacheGateway,
        ledger: Arc<dyn LedgerStore>,
        auth: Arc<dyn Authenticator>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            ledger,
            auth,
            cache_ttl,
        }
    }

    /// Builds a fully in-memory state from configuration.
    ///
    /// The cache backend is returned as well so its store can be handed to
    /// the cleanup task.
    pub fn in_memory(config: &Config) -> (Self, MemoryBackend) {
        let backend = MemoryBackend::new();
        let cache = CacheGateway::new(Arc::new(backend.clone()))
            .with_coalescing(config.coalesce_misses);
        let auth = StaticTokenAuthenticator::new(config.auth_tokens.clone());

        let state = Self::new(
            cache,
            Arc::new(MemoryLedger::new()),
            Arc::new(auth),
            Duration::from_secs(config.cache_ttl),
        );
        (state, backend)
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
