//! Authentication
//!
//! Resolves the bearer token on each request to the user it belongs to.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::api::AppState;
use crate::error::AppError;
use crate::ledger::UserId;

/// Maps an access token to its user.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<UserId>;
}

// == Static Tokens ==
/// Fixed token table, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuthenticator {
    pub fn new(tokens: impl IntoIterator<Item = (String, UserId)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).cloned()
    }
}

// == Extractor ==
/// The authenticated caller. Rejects with 401 when the `Authorization:
/// Bearer` header is missing or the token is unknown.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        match state.auth.authenticate(token) {
            Some(user) => Ok(AuthUser(user)),
            None => {
                debug!("rejected unknown bearer token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
