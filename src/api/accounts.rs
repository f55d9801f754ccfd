//! Account Handlers
//!
//! CRUD over the caller's accounts. Every successful mutation drops the
//! cached aggregates that include account data.

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cache::CachePrefix;
use crate::error::{AppError, Result};
use crate::ledger::{AccountUpdate, NewAccount};
use crate::models::{AccountResponse, AccountsResponse};

use super::extract::{ApiJson, ApiPath};
use super::AppState;

/// Aggregates affected by creating or editing an account.
const ACCOUNT_WRITE_PREFIXES: [CachePrefix; 2] =
    [CachePrefix::ACCOUNTS, CachePrefix::TOTAL_BALANCE];

/// Deleting an account also removes its transactions.
const ACCOUNT_DELETE_PREFIXES: [CachePrefix; 5] = [
    CachePrefix::ACCOUNTS,
    CachePrefix::TOTAL_EXPENSE,
    CachePrefix::TOTAL_BALANCE,
    CachePrefix::CATEGORY_SPENDING,
    CachePrefix::TRANSACTIONS,
];

/// Handler for GET /api/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AccountsResponse>> {
    let accounts = state
        .cache
        .get(user.as_str(), &CachePrefix::ACCOUNTS, state.cache_ttl, || async {
            state.ledger.list_accounts(&user).await.map_err(AppError::from)
        })
        .await?;

    Ok(Json(AccountsResponse::new(accounts)))
}

/// Handler for POST /api/accounts
pub async fn create_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<NewAccount>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let account = state.ledger.create_account(&user, input).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &ACCOUNT_WRITE_PREFIXES)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::new("Account created successfully.", account)),
    ))
}

/// Handler for PUT /api/accounts/:id
pub async fn update_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<AccountUpdate>,
) -> Result<Json<AccountResponse>> {
    let account = state.ledger.update_account(&user, id, update).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &ACCOUNT_WRITE_PREFIXES)
        .await;

    Ok(Json(AccountResponse::new(
        "Account updated successfully.",
        account,
    )))
}

/// Handler for DELETE /api/accounts/:id
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AccountResponse>> {
    let account = state.ledger.delete_account(&user, id).await?;
    state
        .cache
        .invalidate_all(user.as_str(), &ACCOUNT_DELETE_PREFIXES)
        .await;

    Ok(Json(AccountResponse::new(
        "Account deleted successfully.",
        account,
    )))
}
