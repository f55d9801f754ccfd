//! Response DTOs for the finance API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::ledger::{Account, SavingsAccount, SavingsTransaction, Transaction};

/// Response body for `GET /api/accounts`
#[derive(Debug, Clone, Serialize)]
pub struct AccountsResponse {
    pub message: String,
    pub accounts: Vec<Account>,
}

impl AccountsResponse {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            message: "Accounts fetched successfully.".to_string(),
            accounts,
        }
    }
}

/// Response body for account mutations
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub message: String,
    pub account: Account,
}

impl AccountResponse {
    pub fn new(message: impl Into<String>, account: Account) -> Self {
        Self {
            message: message.into(),
            account,
        }
    }
}

/// Response body for `GET /api/transactions`
#[derive(Debug, Clone, Serialize)]
pub struct TransactionsResponse {
    pub message: String,
    pub transactions: Vec<Transaction>,
}

impl TransactionsResponse {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            message: "Transactions fetched successfully.".to_string(),
            transactions,
        }
    }
}

/// Response body for transaction mutations
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub transaction: Transaction,
}

impl TransactionResponse {
    pub fn new(message: impl Into<String>, transaction: Transaction) -> Self {
        Self {
            message: message.into(),
            transaction,
        }
    }
}

/// Response body for `POST /api/transactions/bulk`
#[derive(Debug, Clone, Serialize)]
pub struct BulkTransactionsResponse {
    pub message: String,
    pub transactions: Vec<Transaction>,
}

impl BulkTransactionsResponse {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            message: format!("{} transactions created successfully.", transactions.len()),
            transactions,
        }
    }
}

/// Response body for `GET /api/savings`
#[derive(Debug, Clone, Serialize)]
pub struct SavingsListResponse {
    pub message: String,
    pub savings: Vec<SavingsAccount>,
}

impl SavingsListResponse {
    pub fn new(savings: Vec<SavingsAccount>) -> Self {
        Self {
            message: "Savings fetched successfully.".to_string(),
            savings,
        }
    }
}

/// Response body for savings account mutations
#[derive(Debug, Clone, Serialize)]
pub struct SavingsResponse {
    pub message: String,
    pub savings: SavingsAccount,
}

impl SavingsResponse {
    pub fn new(message: impl Into<String>, savings: SavingsAccount) -> Self {
        Self {
            message: message.into(),
            savings,
        }
    }
}

/// Response body for `GET /api/savings/saving-transaction`
#[derive(Debug, Clone, Serialize)]
pub struct SavingsTransactionsResponse {
    pub message: String,
    pub transactions: Vec<SavingsTransaction>,
}

impl SavingsTransactionsResponse {
    pub fn new(transactions: Vec<SavingsTransaction>) -> Self {
        Self {
            message: "Savings transactions fetched successfully.".to_string(),
            transactions,
        }
    }
}

/// Response body for savings transaction mutations
#[derive(Debug, Clone, Serialize)]
pub struct SavingsTransactionResponse {
    pub message: String,
    pub transaction: SavingsTransaction,
}

impl SavingsTransactionResponse {
    pub fn new(message: impl Into<String>, transaction: SavingsTransaction) -> Self {
        Self {
            message: message.into(),
            transaction,
        }
    }
}

/// Cached body of `GET /api/dashboard/total-balance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalBalance {
    pub total_balance: f64,
}

/// Cached body of `GET /api/dashboard/total-expense`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalExpense {
    pub total_expense: f64,
}

/// Response body for `GET /api/dashboard/category-spending`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendingResponse {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub by_category: BTreeMap<String, f64>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
