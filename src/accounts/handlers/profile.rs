//! Authenticated self-service profile endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via session cookie.
//! 2) Validate the payload against the profile schema.
//! 3) Apply allow-listed updates.

use super::UserView;
use crate::accounts::{
    error::AccountError,
    principal::Principal,
    service::{AccountService, ProfilePatch},
    validation,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct ProfileUpdateRequest {
    name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Return the authenticated user profile.", body = UserView),
        (status = 401, description = "Missing or invalid session cookie."),
    ),
    tag = "profile"
)]
pub async fn get_profile(
    principal: Principal,
    service: Extension<Arc<AccountService>>,
) -> Result<impl IntoResponse, AccountError> {
    let user = service.profile(&principal).await?;
    Ok((StatusCode::OK, Json(UserView::from(user))))
}

#[utoipa::path(
    post,
    path = "/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated.", body = UserView),
        (status = 400, description = "Invalid or disallowed field in update payload."),
        (status = 401, description = "Missing or invalid session cookie."),
    ),
    tag = "profile"
)]
#[instrument(skip(service, payload))]
pub async fn update_profile(
    principal: Principal,
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Value>>,
) -> Result<impl IntoResponse, AccountError> {
    let request: ProfileUpdateRequest =
        validation::PROFILE_UPDATE.parse(payload.as_ref().map(|Json(v)| v))?;

    let user = service
        .update_profile(&principal, ProfilePatch { name: request.name })
        .await?;

    Ok((StatusCode::OK, Json(UserView::from(user))))
}
