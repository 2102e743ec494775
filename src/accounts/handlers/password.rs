use crate::accounts::{
    error::AccountError,
    principal::Principal,
    service::{AccountService, PasswordChange},
    validation,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
    confirm_new_password: String,
}

#[utoipa::path(
    post,
    path = "/profile/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed."),
        (status = 400, description = "Wrong current password, confirmation mismatch or new password too short."),
        (status = 401, description = "Missing or invalid session cookie."),
    ),
    tag = "profile"
)]
#[instrument(skip(service, payload))]
pub async fn change_password(
    principal: Principal,
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Value>>,
) -> Result<impl IntoResponse, AccountError> {
    let request: ChangePasswordRequest =
        validation::CHANGE_PASSWORD.parse(payload.as_ref().map(|Json(v)| v))?;

    service
        .change_password(
            &principal,
            PasswordChange {
                old_password: request.old_password,
                new_password: request.new_password,
                confirm_new_password: request.confirm_new_password,
            },
        )
        .await?;

    Ok((StatusCode::OK, "Password changed"))
}
