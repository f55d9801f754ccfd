//! Dashboard Handlers
//!
//! Read-only aggregate views. Each is computed by a fetch closure and served
//! through the cache gateway under its own prefix, keyed by user id.

use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::cache::CachePrefix;
use crate::error::{AppError, Result};
use crate::ledger::{self, ExpenseRecord};
use crate::models::{CategorySpendingQuery, CategorySpendingResponse, TotalBalance, TotalExpense};

use super::extract::ApiQuery;
use super::AppState;

/// Handler for GET /api/dashboard/total-balance
pub async fn total_balance(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TotalBalance>> {
    let data = state
        .cache
        .get(
            user.as_str(),
            &CachePrefix::TOTAL_BALANCE,
            state.cache_ttl,
            || async {
                let accounts = state.ledger.list_accounts(&user).await?;
                Ok::<_, AppError>(TotalBalance {
                    total_balance: ledger::total_balance(&accounts),
                })
            },
        )
        .await?;

    Ok(Json(data))
}

/// Handler for GET /api/dashboard/total-expense
pub async fn total_expense(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TotalExpense>> {
    let data = state
        .cache
        .get(
            user.as_str(),
            &CachePrefix::TOTAL_EXPENSE,
            state.cache_ttl,
            || async {
                let transactions = state.ledger.list_transactions(&user).await?;
                Ok::<_, AppError>(TotalExpense {
                    total_expense: ledger::total_expense(&transactions),
                })
            },
        )
        .await?;

    Ok(Json(data))
}

/// Handler for GET /api/dashboard/category-spending
///
/// The user's dated expense records are cached as one entry; the requested
/// range is applied after the lookup, so any range shares that entry.
pub async fn category_spending(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<CategorySpendingQuery>,
) -> Result<Json<CategorySpendingResponse>> {
    let (start_date, end_date) = query.resolve_range().map_err(AppError::InvalidRequest)?;

    let records: Vec<ExpenseRecord> = state
        .cache
        .get(
            user.as_str(),
            &CachePrefix::CATEGORY_SPENDING,
            state.cache_ttl,
            || async {
                let transactions = state.ledger.list_transactions(&user).await?;
                Ok::<_, AppError>(ledger::expense_records(&transactions))
            },
        )
        .await?;

    Ok(Json(CategorySpendingResponse {
        start_date,
        end_date,
        by_category: ledger::spending_by_category(&records, start_date, end_date),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::{AccountType, NewAccount, NewTransaction, TransactionKind, UserId};
    use chrono::{TimeZone, Utc};

    async fn seeded_state() -> (AppState, UserId) {
        let (state, _) = AppState::in_memory(&Config::default());
        let user = UserId::new("u1");
        let account = state
            .ledger
            .create_account(
                &user,
                NewAccount {
                    name: "Main".to_string(),
                    account_type: AccountType::Checking,
                    balance: 500.0,
                },
            )
            .await
            .unwrap();
        state
            .ledger
            .create_transaction(
                &user,
                NewTransaction {
                    account_id: account.id,
                    kind: TransactionKind::Expense,
                    amount: 30.0,
                    category: "Food".to_string(),
                    description: None,
                    date: Some(Utc.with_ymd_and_hms(2026, 9, 3, 10, 0, 0).unwrap()),
                },
            )
            .await
            .unwrap();
        (state, user)
    }

    #[tokio::test]
    async fn test_total_balance_is_cached() {
        let (state, user) = seeded_state().await;

        let first = total_balance(State(state.clone()), AuthUser(user.clone()))
            .await
            .unwrap();
        assert_eq!(first.total_balance, 470.0);

        // Mutate the ledger behind the cache's back: the cached value stays
        state
            .ledger
            .create_account(
                &user,
                NewAccount {
                    name: "Savings".to_string(),
                    account_type: AccountType::Savings,
                    balance: 30.0,
                },
            )
            .await
            .unwrap();

        let second = total_balance(State(state.clone()), AuthUser(user))
            .await
            .unwrap();
        assert_eq!(second.total_balance, 470.0);
        assert_eq!(state.cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_total_expense() {
        let (state, user) = seeded_state().await;
        let data = total_expense(State(state), AuthUser(user)).await.unwrap();
        assert_eq!(data.total_expense, 30.0);
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> ApiQuery<CategorySpendingQuery> {
        ApiQuery(CategorySpendingQuery {
            start_date: Some(Utc.with_ymd_and_hms(2026, start.0, start.1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2026, end.0, end.1, 23, 59, 59).unwrap()),
        })
    }

    #[tokio::test]
    async fn test_category_spending_for_range() {
        let (state, user) = seeded_state().await;

        let september = category_spending(
            State(state.clone()),
            AuthUser(user.clone()),
            range((9, 1), (9, 30)),
        )
        .await
        .unwrap();
        assert_eq!(september.by_category["Food"], 30.0);

        let august = category_spending(
            State(state.clone()),
            AuthUser(user),
            range((8, 1), (8, 31)),
        )
        .await
        .unwrap();
        assert!(august.by_category.is_empty());

        // Both ranges came from one cached entry
        assert_eq!(state.cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_category_spending_range_across_months() {
        let (state, user) = seeded_state().await;
        let account = state.ledger.list_accounts(&user).await.unwrap()[0].id;
        for (month, day, amount) in [(8, 30, 4.0), (9, 1, 6.0), (10, 2, 8.0)] {
            state
                .ledger
                .create_transaction(
                    &user,
                    NewTransaction {
                        account_id: account,
                        kind: TransactionKind::Expense,
                        amount,
                        category: "Food".to_string(),
                        description: None,
                        date: Some(Utc.with_ymd_and_hms(2026, month, day, 9, 0, 0).unwrap()),
                    },
                )
                .await
                .unwrap();
        }

        let spending = category_spending(State(state), AuthUser(user), range((8, 29), (9, 2)))
            .await
            .unwrap();

        // Aug 30 and Sep 1 are inside, Sep 3 and Oct 2 are not
        assert_eq!(spending.by_category["Food"], 10.0);
    }

    #[tokio::test]
    async fn test_category_spending_reversed_range() {
        let (state, user) = seeded_state().await;
        let result =
            category_spending(State(state), AuthUser(user), range((10, 1), (9, 1))).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
