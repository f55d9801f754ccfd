//! Cache Module
//!
//! Read-through caching of per-user aggregates with TTL expiration and
//! prefix-scoped invalidation.

mod backend;
mod entry;
mod gateway;
mod inflight;
mod key;
mod memory;
mod stats;


// Re-export public types
pub use backend::CacheBackend;
pub use entry::CacheEntry;
pub use gateway::CacheGateway;
pub use inflight::{InflightGuard, InflightRegistry};
pub use key::{CachePrefix, CompositeKey};
pub use memory::{MemoryBackend, MemoryStore};
pub use stats::{CacheStats, StatsRecorder};

// == Public Constants ==
/// Maximum allowed owner key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
