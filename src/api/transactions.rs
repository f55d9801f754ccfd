//! Transaction Handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cache::CachePrefix;
use crate::error::{AppError, Result};
use crate::ledger::NewTransaction;
use crate::models::{
    BulkTransactionsRequest, BulkTransactionsResponse, TransactionResponse, TransactionsResponse,
};

use super::extract::{ApiJson, ApiPath};
use super::AppState;

/// A transaction moves an account balance and feeds every spending view.
const TRANSACTION_WRITE_PREFIXES: [CachePrefix; 5] = [
    CachePrefix::TRANSACTIONS,
    CachePrefix::ACCOUNTS,
    CachePrefix::TOTAL_BALANCE,
    CachePrefix::TOTAL_EXPENSE,
    CachePrefix::CATEGORY_SPENDING,
];

/// Handler for GET /api/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TransactionsResponse>> {
    let transactions = state
        .cache
        .get(
            user.as_str(),
            &CachePrefix::TRANSACTIONS,
            state.cache_ttl,
            || async {
                state
                    .ledger
                    .list_transactions(&user)
                    .await
                    .map_err(AppError::from)
            },
        )
        .await?;

    Ok(Json(TransactionsResponse::new(transactions)))
}

/// Handler for POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<NewTransaction>,
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    let transaction = state.ledger.create_transaction(&user, input).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::new(
            "Transaction created successfully.",
            transaction,
        )),
    ))
}

/// Handler for POST /api/transactions/bulk
///
/// All rows are written before the cached views are dropped once.
pub async fn create_transactions_bulk(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<BulkTransactionsRequest>,
) -> Result<(StatusCode, Json<BulkTransactionsResponse>)> {
    let transactions = state
        .ledger
        .create_transactions(&user, input.transactions)
        .await?;
    state
        .cache
        .invalidate_all(user.as_str(), &TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(BulkTransactionsResponse::new(transactions)),
    ))
}

/// Handler for PUT /api/transactions/:id
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewTransaction>,
) -> Result<Json<TransactionResponse>> {
    let transaction = state.ledger.update_transaction(&user, id, input).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok(Json(TransactionResponse::new(
        "Transaction updated successfully.",
        transaction,
    )))
}

/// Handler for DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TransactionResponse>> {
    let transaction = state.ledger.delete_transaction(&user, id).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &TRANSACTION_WRITE_PREFIXES)
        .await;

    Ok(Json(TransactionResponse::new(
        "Transaction deleted successfully.",
        transaction,
    )))
}
