//! Ledger Models
//!
//! Domain types for accounts, transactions and savings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

// == User Id ==
/// Authenticated owner of ledger records. Also the cache key for every
/// per-user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Account ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when opening an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub balance: f64,
}

impl NewAccount {
    pub fn validate(&self) -> LedgerResult<()> {
        validate_name(&self.name)?;
        validate_amount("balance", self.balance)
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub balance: Option<f64>,
}

impl AccountUpdate {
    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(balance) = self.balance {
            validate_amount("balance", balance)?;
        }
        Ok(())
    }
}

// == Transaction ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Always positive; `kind` gives the direction
    pub amount: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Effect of this transaction on its account balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Fields accepted when recording a transaction. `date` defaults to now.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn validate(&self) -> LedgerResult<()> {
        validate_positive("amount", self.amount)?;
        if self.category.trim().is_empty() {
            return Err(LedgerError::Invalid("category cannot be empty".to_string()));
        }
        Ok(())
    }
}

// == Savings ==
/// A savings pot, tracked apart from the regular accounts. `amount` is the
/// opening balance; `running_balance` follows its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccount {
    pub id: Uuid,
    pub user_id: UserId,
    pub account_name: String,
    pub savings_type: String,
    pub amount: f64,
    pub running_balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingsAccount {
    pub account_name: String,
    pub savings_type: String,
    #[serde(default)]
    pub amount: f64,
}

impl NewSavingsAccount {
    pub fn validate(&self) -> LedgerResult<()> {
        validate_name(&self.account_name)?;
        if self.savings_type.trim().is_empty() {
            return Err(LedgerError::Invalid("savingsType cannot be empty".to_string()));
        }
        validate_amount("amount", self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsTransactionKind {
    Deposit,
    Interest,
    #[serde(alias = "withdraw")]
    Withdrawal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub savings_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SavingsTransactionKind,
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SavingsTransaction {
    /// Effect of this transaction on the running balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            SavingsTransactionKind::Deposit | SavingsTransactionKind::Interest => self.amount,
            SavingsTransactionKind::Withdrawal => -self.amount,
        }
    }
}

/// Fields accepted when recording a savings transaction. `date` defaults to now.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingsTransaction {
    pub savings_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SavingsTransactionKind,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewSavingsTransaction {
    pub fn validate(&self) -> LedgerResult<()> {
        validate_positive("amount", self.amount)
    }
}

/// Full replacement of an existing savings transaction, addressed by `id`
/// in the body.
#[derive(Debug, Clone, Deserialize)]
pub struct SavingsTransactionUpdate {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: NewSavingsTransaction,
}

fn validate_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Invalid("name cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_amount(field: &str, value: f64) -> LedgerResult<()> {
    if !value.is_finite() {
        return Err(LedgerError::Invalid(format!("{} must be a finite number", field)));
    }
    Ok(())
}

fn validate_positive(field: &str, value: f64) -> LedgerResult<()> {
    validate_amount(field, value)?;
    if value <= 0.0 {
        return Err(LedgerError::Invalid(format!("{} must be greater than zero", field)));
    }
    Ok(())
}
