use super::UserView;
use crate::accounts::{
    error::AccountError,
    service::{AccountService, Signup},
    validation,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct SignupRequest {
    email: String,
    password: String,
    name: Option<String>,
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body = SignupRequest,
    responses (
        (status = 201, description = "Registration successful", body = UserView, content_type = "application/json"),
        (status = 400, description = "Missing or invalid email or password"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag= "accounts"
)]
#[instrument(skip(service, payload))]
pub async fn signup(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Value>>,
) -> Result<impl IntoResponse, AccountError> {
    let request: SignupRequest = validation::SIGNUP.parse(payload.as_ref().map(|Json(v)| v))?;

    debug!("signup for: {}", request.email);

    let user = service
        .signup(Signup {
            email: request.email,
            password: request.password,
            name: request.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}
