use crate::accounts::{service::AccountService, GIT_COMMIT_HASH};
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User store is healthy", body = Health),
        (status = 503, description = "User store is unhealthy", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(service: Extension<Arc<AccountService>>) -> impl IntoResponse {
    let ping_span = info_span!("store.ping");
    let status = match service.store().ping().instrument(ping_span).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            error!("Failed to ping user store: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let body = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if status == StatusCode::OK { "ok" } else { "error" }.to_string(),
    };

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or(GIT_COMMIT_HASH);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        headers.insert("x-app", value);
    }

    (status, headers, Json(body))
}
