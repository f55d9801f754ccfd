//! Cache Key Module
//!
//! Typed prefixes and the composite key that namespaces cached aggregates.

use std::borrow::Cow;
use std::fmt;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, CacheResult};

// == Cache Prefix ==
/// Namespace tag grouping cache entries by aggregate kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePrefix(Cow<'static, str>);

impl CachePrefix {
    /// Per-user account list.
    pub const ACCOUNTS: CachePrefix = CachePrefix(Cow::Borrowed("accounts"));
    /// Per-user transaction list.
    pub const TRANSACTIONS: CachePrefix = CachePrefix(Cow::Borrowed("transactions"));
    /// Sum of account balances.
    pub const TOTAL_BALANCE: CachePrefix = CachePrefix(Cow::Borrowed("total-balance"));
    /// Sum of expense transactions.
    pub const TOTAL_EXPENSE: CachePrefix = CachePrefix(Cow::Borrowed("total-expense"));
    /// Dated expense records behind the category breakdown.
    pub const CATEGORY_SPENDING: CachePrefix = CachePrefix(Cow::Borrowed("category-spending"));
    /// Per-user savings account list.
    pub const SAVINGS: CachePrefix = CachePrefix(Cow::Borrowed("savings"));
    /// Per-user savings transaction list.
    pub const SAVINGS_TRANSACTIONS: CachePrefix =
        CachePrefix(Cow::Borrowed("savings-transactions"));

    /// Creates a prefix from a runtime string. Empty prefixes are rejected.
    pub fn new(prefix: impl Into<String>) -> CacheResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CacheError::InvalidPrefix("prefix cannot be empty".to_string()));
        }
        Ok(Self(Cow::Owned(prefix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CachePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Composite Key ==
/// Store-level identifier derived from `(prefix, key)`.
///
/// Encoded as `<prefix byte length>:<prefix>:<key>`. The length marks where
/// the prefix ends, so a `:` inside either part cannot make two distinct
/// pairs encode to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Builds the composite key, validating the owner key.
    ///
    /// # Errors
    /// `CacheError::InvalidKey` if `key` is empty or longer than
    /// [`MAX_KEY_LENGTH`] bytes.
    pub fn new(prefix: &CachePrefix, key: &str) -> CacheResult<Self> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let prefix = prefix.as_str();
        Ok(Self(format!("{}:{}:{}", prefix.len(), prefix, key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
