//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::ledger::UserId;

/// Token table used when `AUTH_TOKENS` is not set.
pub const DEMO_AUTH_TOKENS: &str = "demo-token:demo-user";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime of cached aggregates in seconds
    pub cache_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Share one fetch between concurrent misses on the same key
    pub coalesce_misses: bool,
    /// Bearer tokens and the users they authenticate
    pub auth_tokens: Vec<(String, UserId)>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL_SECS` - Aggregate cache TTL in seconds (default: 345600, 4 days)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `COALESCE_MISSES` - `true`/`1` to enable miss coalescing (default: false)
    /// - `AUTH_TOKENS` - Comma-separated `token:user_id` pairs
    ///   (default: `demo-token:demo-user`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_ttl: parse_env("CACHE_TTL_SECS")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            coalesce_misses: env::var("COALESCE_MISSES")
                .ok()
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.coalesce_misses),
            auth_tokens: env::var("AUTH_TOKENS")
                .ok()
                .map(|v| parse_tokens(&v))
                .unwrap_or(defaults.auth_tokens),
        }
    }

    /// True when the token table is the built-in demo one.
    pub fn uses_demo_tokens(&self) -> bool {
        self.auth_tokens == parse_tokens(DEMO_AUTH_TOKENS)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl: 60 * 60 * 24 * 4,
            cleanup_interval: 1,
            coalesce_misses: false,
            auth_tokens: parse_tokens(DEMO_AUTH_TOKENS),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Parses `token:user,token:user`. Malformed pairs are skipped.
pub fn parse_tokens(raw: &str) -> Vec<(String, UserId)> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, user) = pair.trim().split_once(':')?;
            let (token, user) = (token.trim(), user.trim());
            if token.is_empty() || user.is_empty() {
                return None;
            }
            Some((token.to_string(), UserId::new(user)))
        })
        .collect()
}
