//! Slipbook web server library.
//!
//! Owner pages, the public storefront, the admin back-office and the campaign
//! dispatch API all live in this crate. The binary in `main.rs` only wires
//! observability and starts the server around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::services::ServeDir;

use crate::config::ConfigError;
use crate::state::AppState;

/// Build the full application router with sessions and per-request middleware.
///
/// Sentry and tracing layers are added by the binary so tests can drive the
/// router without a global subscriber.
///
/// # Errors
///
/// Returns `ConfigError` if the session secret cannot produce a signing key.
pub fn app(state: AppState) -> Result<Router, ConfigError> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config())?;
    let uploads = ServeDir::new(&state.config().upload_dir);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/web/static"))
        .nest_service("/uploads", uploads)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::record_page_view,
        ))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(state))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
