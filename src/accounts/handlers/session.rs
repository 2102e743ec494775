use super::UserView;
use crate::accounts::{
    error::AccountError,
    principal::session_token,
    service::AccountService,
    session::{expired_session_cookie, session_cookie},
    validation,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set.", body = UserView),
        (status = 400, description = "Missing email or password."),
        (status = 401, description = "Invalid email or password."),
    ),
    tag = "session"
)]
#[instrument(skip(service, payload))]
pub async fn login(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Value>>,
) -> Result<impl IntoResponse, AccountError> {
    let request: LoginRequest = validation::LOGIN.parse(payload.as_ref().map(|Json(v)| v))?;

    let login = service.login(&request.email, &request.password).await?;
    let cookie = session_cookie(&login.token, service.sessions().ttl());

    debug!(user_id = %login.user.id, "session started");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(UserView::from(login.user)),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Session revoked and cookie cleared."),
    ),
    tag = "session"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<Arc<AccountService>>,
) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        service.logout(token).await;
    }

    (StatusCode::NO_CONTENT, [(SET_COOKIE, expired_session_cookie())])
}
