//! Ledger Aggregates
//!
//! Per-user summaries served by the dashboard. These are what the cache
//! gateway stores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Account, Transaction, TransactionKind};

/// The part of an expense the category breakdown needs. A user's full list
/// of these is cached; date ranges are applied on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

/// Sum of all account balances.
pub fn total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|account| account.balance).sum()
}

/// Sum of all expense amounts.
pub fn total_expense(transactions: &[Transaction]) -> f64 {
    expenses(transactions).map(|tx| tx.amount).sum()
}

/// Every expense, reduced to category, amount and date.
pub fn expense_records(transactions: &[Transaction]) -> Vec<ExpenseRecord> {
    expenses(transactions)
        .map(|tx| ExpenseRecord {
            category: tx.category.clone(),
            amount: tx.amount,
            date: tx.date,
        })
        .collect()
}

/// Sums expenses dated within `start..=end` by category.
pub fn spending_by_category(
    records: &[ExpenseRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BTreeMap<String, f64> {
    let mut spending = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| record.date >= start && record.date <= end)
    {
        *spending.entry(record.category.clone()).or_default() += record.amount;
    }
    spending
}

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
}
