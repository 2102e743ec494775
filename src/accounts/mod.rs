pub mod error;
pub mod handlers;
pub mod openapi;
pub mod policy;
pub mod principal;
pub mod service;
pub mod session;
pub mod validation;

pub use self::error::AccountError;
pub use self::handlers::UserView;
pub use self::openapi::openapi;
pub use self::service::AccountService;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Build the application router around an account service.
///
/// The service travels as an `Extension`, which is also where the
/// [`principal::Principal`] extractor looks it up.
#[must_use]
pub fn router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/signup", post(handlers::signup))
        .route(
            "/profile",
            get(handlers::get_profile).post(handlers::update_profile),
        )
        .route("/profile/change-password", post(handlers::change_password))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(service)),
        )
}

/// Start the server
///
/// The store is closed once the server has drained.
///
/// # Errors
/// Return error if failed to bind or serve.
pub async fn new(port: u16, service: AccountService) -> Result<()> {
    let service = Arc::new(service);
    let app = router(Arc::clone(&service));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.store().close().await;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
