//! Authenticated principal extraction.
//!
//! Flow Overview: read the session cookie, resolve it to a user through the
//! [`AccountService`], and hand the principal to the handler as an explicit
//! argument.

use super::{error::AccountError, service::AccountService, session::token_from_cookie};
use crate::store::User;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated user context derived from the session cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Session token from the request, if any.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_cookie)
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Arc<AccountService>>()
            .cloned()
            .ok_or_else(|| AccountError::Internal("account service not configured".to_string()))?;

        let token = session_token(&parts.headers).ok_or(AccountError::Unauthorized)?;

        service.authenticate(token).await
    }
}
