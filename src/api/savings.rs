//! Savings Handlers
//!
//! Savings accounts and their deposits, interest and withdrawals. Both lists
//! are cached per user; transaction writes also drop the savings list since
//! they move its running balances.

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cache::CachePrefix;
use crate::error::{AppError, Result};
use crate::ledger::{NewSavingsAccount, NewSavingsTransaction, SavingsTransactionUpdate};
use crate::models::{
    SavingsListResponse, SavingsResponse, SavingsTransactionResponse, SavingsTransactionsQuery,
    SavingsTransactionsResponse,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;

const SAVINGS_WRITE_PREFIXES: [CachePrefix; 1] = [CachePrefix::SAVINGS];

/// Deleting a savings account also removes its transactions.
const SAVINGS_DELETE_PREFIXES: [CachePrefix; 2] =
    [CachePrefix::SAVINGS, CachePrefix::SAVINGS_TRANSACTIONS];

const SAVINGS_TRANSACTION_WRITE_PREFIXES: [CachePrefix; 2] =
    [CachePrefix::SAVINGS_TRANSACTIONS, CachePrefix::SAVINGS];

/// Handler for GET /api/savings
pub async fn list_savings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<SavingsListResponse>> {
    let savings = state
        .cache
        .get(user.as_str(), &CachePrefix::SAVINGS, state.cache_ttl, || async {
            state.ledger.list_savings(&user).await.map_err(AppError::from)
        })
        .await?;

    Ok(Json(SavingsListResponse::new(savings)))
}

/// Handler for POST /api/savings
pub async fn create_savings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<NewSavingsAccount>,
) -> Result<(StatusCode, Json<SavingsResponse>)> {
    let savings = state.ledger.create_savings(&user, input).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &SAVINGS_WRITE_PREFIXES)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(SavingsResponse::new("Savings created successfully.", savings)),
    ))
}

/// Handler for DELETE /api/savings/:id
pub async fn delete_savings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SavingsResponse>> {
    let savings = state.ledger.delete_savings(&user, id).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &SAVINGS_DELETE_PREFIXES)
        .await;

    Ok(Json(SavingsResponse::new(
        "Savings deleted successfully.",
        savings,
    )))
}

/// Handler for GET /api/savings/saving-transaction
///
/// The user's full list is cached; `?savingsId=` narrows it after lookup.
pub async fn list_savings_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<SavingsTransactionsQuery>,
) -> Result<Json<SavingsTransactionsResponse>> {
    let mut transactions = state
        .cache
        .get(
            user.as_str(),
            &CachePrefix::SAVINGS_TRANSACTIONS,
            state.cache_ttl,
            || async {
                state
                    .ledger
                    .list_savings_transactions(&user, None)
                    .await
                    .map_err(AppError::from)
            },
        )
        .await?;

    if let Some(savings_id) = query.savings_id {
        transactions.retain(|tx| tx.savings_id == savings_id);
    }
    Ok(Json(SavingsTransactionsResponse::new(transactions)))
}

/// Handler for POST /api/savings/saving-transaction
pub async fn create_savings_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<NewSavingsTransaction>,
) -> Result<(StatusCode, Json<SavingsTransactionResponse>)> {
    let transaction = state.ledger.create_savings_transaction(&user, input).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &SAVINGS_TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(SavingsTransactionResponse::new(
            "Savings transaction created successfully.",
            transaction,
        )),
    ))
}

/// Handler for PUT /api/savings/saving-transaction
pub async fn update_savings_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<SavingsTransactionUpdate>,
) -> Result<Json<SavingsTransactionResponse>> {
    let transaction = state.ledger.update_savings_transaction(&user, update).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &SAVINGS_TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok(Json(SavingsTransactionResponse::new(
        "Savings transaction updated successfully.",
        transaction,
    )))
}

/// Handler for DELETE /api/savings/saving-transaction/:id
pub async fn delete_savings_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SavingsTransactionResponse>> {
    let transaction = state.ledger.delete_savings_transaction(&user, id).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &SAVINGS_TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok(Json(SavingsTransactionResponse::new(
        "Savings transaction deleted successfully.",
        transaction,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::{SavingsTransactionKind, UserId};

    fn state() -> AppState {
        AppState::in_memory(&Config::default()).0
    }

    fn user() -> AuthUser {
        AuthUser(UserId::new("u1"))
    }

    fn pot(name: &str, amount: f64) -> ApiJson<NewSavingsAccount> {
        ApiJson(NewSavingsAccount {
            account_name: name.to_string(),
            savings_type: "emergency".to_string(),
            amount,
        })
    }

    fn movement(
        savings_id: Uuid,
        kind: SavingsTransactionKind,
        amount: f64,
    ) -> NewSavingsTransaction {
        NewSavingsTransaction {
            savings_id,
            kind,
            amount,
            date: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_transaction_refreshes_cached_running_balance() {
        let state = state();
        let (_, created) = create_savings(State(state.clone()), user(), pot("Fund", 100.0))
            .await
            .unwrap();

        let before = list_savings(State(state.clone()), user()).await.unwrap();
        assert_eq!(before.savings[0].running_balance, 100.0);

        create_savings_transaction(
            State(state.clone()),
            user(),
            ApiJson(movement(created.savings.id, SavingsTransactionKind::Deposit, 50.0)),
        )
        .await
        .unwrap();

        let after = list_savings(State(state), user()).await.unwrap();
        assert_eq!(after.savings[0].running_balance, 150.0);
    }

    #[tokio::test]
    async fn test_update_refreshes_cached_transactions() {
        let state = state();
        let (_, created) = create_savings(State(state.clone()), user(), pot("Fund", 0.0))
            .await
            .unwrap();
        let savings_id = created.savings.id;
        let (_, tx) = create_savings_transaction(
            State(state.clone()),
            user(),
            ApiJson(movement(savings_id, SavingsTransactionKind::Deposit, 10.0)),
        )
        .await
        .unwrap();

        let listed = list_savings_transactions(
            State(state.clone()),
            user(),
            ApiQuery(SavingsTransactionsQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(listed.transactions[0].amount, 10.0);

        update_savings_transaction(
            State(state.clone()),
            user(),
            ApiJson(SavingsTransactionUpdate {
                id: tx.transaction.id,
                fields: movement(savings_id, SavingsTransactionKind::Interest, 12.0),
            }),
        )
        .await
        .unwrap();

        let listed = list_savings_transactions(
            State(state.clone()),
            user(),
            ApiQuery(SavingsTransactionsQuery {
                savings_id: Some(savings_id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.transactions.len(), 1);
        assert_eq!(listed.transactions[0].kind, SavingsTransactionKind::Interest);
        assert_eq!(listed.transactions[0].amount, 12.0);
    }

    #[tokio::test]
    async fn test_list_filters_by_savings_id() {
        let state = state();
        let (_, first) = create_savings(State(state.clone()), user(), pot("First", 0.0))
            .await
            .unwrap();
        let (_, second) = create_savings(State(state.clone()), user(), pot("Second", 0.0))
            .await
            .unwrap();
        for savings_id in [first.savings.id, second.savings.id] {
            create_savings_transaction(
                State(state.clone()),
                user(),
                ApiJson(movement(savings_id, SavingsTransactionKind::Deposit, 1.0)),
            )
            .await
            .unwrap();
        }

        let only_first = list_savings_transactions(
            State(state.clone()),
            user(),
            ApiQuery(SavingsTransactionsQuery {
                savings_id: Some(first.savings.id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(only_first.transactions.len(), 1);

        let all = list_savings_transactions(
            State(state.clone()),
            user(),
            ApiQuery(SavingsTransactionsQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(all.transactions.len(), 2);

        // One cached list served both reads
        assert_eq!(state.cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_delete_savings_invalidates_both_lists() {
        let state = state();
        let (_, created) = create_savings(State(state.clone()), user(), pot("Fund", 0.0))
            .await
            .unwrap();

        delete_savings(State(state.clone()), user(), ApiPath(created.savings.id))
            .await
            .unwrap();

        // 1 from the create, 2 from the delete
        assert_eq!(state.cache.stats().await.invalidations, 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_savings_transaction() {
        let result =
            delete_savings_transaction(State(state()), user(), ApiPath(Uuid::new_v4())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
