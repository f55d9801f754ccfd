//! Request DTOs for the finance API
//!
//! Account and transaction bodies deserialize straight into the ledger input
//! types; this module holds query parameters and wrapper bodies.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::ledger::NewTransaction;

/// Query string for `GET /api/dashboard/category-spending`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpendingQuery {
    /// Inclusive lower bound (ISO 8601); start of the current UTC month when absent
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound (ISO 8601); end of the current UTC month when absent
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl CategorySpendingQuery {
    /// Returns the requested `(start, end)` range.
    ///
    /// Returns an error message if the range ends before it starts.
    pub fn resolve_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let (month_start, month_end) = current_month(Utc::now());
        let start = self.start_date.unwrap_or(month_start);
        let end = self.end_date.unwrap_or(month_end);

        if start > end {
            return Err("startDate must not be after endDate".to_string());
        }
        Ok((start, end))
    }
}

/// First and last millisecond of the UTC month containing `now`.
fn current_month(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let next = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start, next - Duration::milliseconds(1))
}

/// Body of `POST /api/transactions/bulk`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkTransactionsRequest {
    pub transactions: Vec<NewTransaction>,
}

/// Query string for `GET /api/savings/saving-transaction`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsTransactionsQuery {
    /// Only transactions of this savings account
    #[serde(default)]
    pub savings_id: Option<Uuid>,
}
