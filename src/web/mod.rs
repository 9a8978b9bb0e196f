use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

use crate::{
    auth_service::SharedAuthService,
    gate::{LOGIN_PATH, WORKFLOWS_PATH},
};

pub mod forms;
pub mod handlers;
pub mod pages;

pub use pages::{PageError, Pages};

pub const REGISTER_PATH: &str = "/register";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router around an authentication service.
///
/// # Errors
/// Returns an error if the page templates fail to compile.
pub fn router(service: SharedAuthService) -> Result<Router> {
    let pages = Arc::new(Pages::new().context("Failed to compile page templates")?);

    let app = Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::health::health))
        .route(LOGIN_PATH, get(handlers::login::login))
        .route(
            REGISTER_PATH,
            get(handlers::register::register_form).post(handlers::register::register),
        )
        .route(WORKFLOWS_PATH, get(handlers::workflows::workflows))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(service))
                .layer(Extension(pages)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn serve(port: u16, service: SharedAuthService) -> Result<()> {
    let app = router(service)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
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
