//! Account error taxonomy and its mapping to HTTP responses.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AccountError {
    /// Missing, malformed or disallowed input.
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    Conflict,
    /// The supplied current password does not match the stored hash.
    #[error("Old password is incorrect")]
    AuthMismatch,
    /// New password and its confirmation differ.
    #[error("New password and confirmation do not match")]
    Mismatch,
    #[error("New password must be longer than {0} characters")]
    Weakness(usize),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not found")]
    NotFound,
    #[error("store failure: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AccountError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AuthMismatch | Self::Mismatch | Self::Weakness(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict => StatusCode::CONFLICT,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => Self::Conflict,
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::Backend(message) => Self::Store(message),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status();

        // server faults are logged in full but never echoed to the caller
        let body = if status.is_server_error() {
            error!("{self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, body).into_response()
    }
}
