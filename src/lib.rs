//! Finance Cache - personal-finance API with cached per-user aggregates
//!
//! Dashboard aggregates (account and savings lists, total balance, spending
//! breakdowns) are served through a read-through cache with TTL expiry and
//! prefix-scoped invalidation on every write.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheGateway, CachePrefix};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
