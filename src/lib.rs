//! Usergate is a minimal user CRUD API over a relational store.

#![forbid(unsafe_code)]
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod response;
mod router;
pub mod telemetry;
pub mod user;

use std::sync::Arc;

use axum::http::{Method, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use error::ServerError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

/// Send a JSON request to `app` and decode the JSON reply.
/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: &str,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::extract::Request;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub users: user::UserService,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().latency_unit(LatencyUnit::Micros)),
        )
        // Turn panics into 500 instead of dropping the connection.
        .layer(CatchPanicLayer::new())
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::HEAD,
                    Method::PUT,
                    Method::PATCH,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::ORIGIN,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::AUTHORIZATION,
                ]),
        );

    Router::new()
        // `GET /health` goes to `health`.
        .route("/health", get(router::status::health))
        // `GET /metrics` goes to `render`.
        .route("/metrics", get(telemetry::render))
        // `/api/v1/users[/{id}]` goes to the user handlers.
        .nest("/api/v1", router::users::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: &config::Configuration,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store = database::connect(&config.database).await?;
    let pwd = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);

    Ok(AppState {
        users: user::UserService::new(store, pwd),
        metrics,
    })
}
