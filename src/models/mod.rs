//! Request and Response models for the finance API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BulkTransactionsRequest, CategorySpendingQuery, SavingsTransactionsQuery};
pub use responses::{
    AccountResponse, AccountsResponse, BulkTransactionsResponse, CategorySpendingResponse,
    HealthResponse, SavingsListResponse, SavingsResponse, SavingsTransactionResponse,
    SavingsTransactionsResponse, StatsResponse, TotalBalance, TotalExpense, TransactionResponse,
    TransactionsResponse,
};
