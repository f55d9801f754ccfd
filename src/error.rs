//! Error types for the finance API
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

// == Cache Error Enum ==
/// Errors raised by the cache layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Owner key is empty or too long
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Prefix is empty
    #[error("Invalid cache prefix: {0}")]
    InvalidPrefix(String),

    /// TTL of zero
    #[error("Cache TTL must be greater than zero")]
    InvalidTtl,

    /// Backing store could not complete the operation
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

// == Ledger Error Enum ==
/// Errors raised by the ledger store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Savings account not found: {0}")]
    SavingsNotFound(Uuid),

    #[error("Savings transaction not found: {0}")]
    SavingsTransactionNotFound(Uuid),

    /// Input rejected by validation
    #[error("{0}")]
    Invalid(String),
}

// == App Error Enum ==
/// Unified error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unknown bearer token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Invalid request data
    #[error("{0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Server error: {0}")]
    Internal(String),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidKey(_) | CacheError::InvalidPrefix(_) | CacheError::InvalidTtl => {
                AppError::InvalidRequest(err.to_string())
            }
            CacheError::Unavailable(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_) => AppError::NotFound("Account not found".to_string()),
            LedgerError::TransactionNotFound(_) => {
                AppError::NotFound("Transaction not found".to_string())
            }
            LedgerError::SavingsNotFound(_) => {
                AppError::NotFound("Savings account not found".to_string())
            }
            LedgerError::SavingsTransactionNotFound(_) => {
                AppError::NotFound("Savings transaction not found".to_string())
            }
            LedgerError::Invalid(msg) => AppError::InvalidRequest(msg),
        }
    }
}

// Extractor rejections are reported as 400 with the usual `{"message"}` body

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(msg) => {
                error!(error = %msg, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
