//! Page-view logging for the admin activity charts.

use axum::{
    extract::{Request, State},
    http::{Method, Response, header::CONTENT_TYPE},
    middleware::Next,
    response::Response as AxumResponse,
};
use chrono::Utc;

use super::auth::OptionalAuth;
use crate::db::ActivityRepository;
use crate::state::AppState;

/// Path prefixes that never count as page views.
const SKIPPED_PREFIXES: [&str; 4] = ["/static/", "/uploads/", "/health", "/api/"];

/// Record successful HTML page loads by signed-in users.
///
/// The insert runs on a spawned task; a failure is logged and never affects
/// the response.
pub async fn record_page_view(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    request: Request,
    next: Next,
) -> AxumResponse {
    let is_get = request.method() == Method::GET;
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    if let Some(user) = user
        && is_get
        && is_trackable(&path, &response)
    {
        let pool = state.pool().clone();
        tokio::spawn(async move {
            if let Err(e) = ActivityRepository::new(&pool)
                .record(Some(user.id), &path, Utc::now())
                .await
            {
                tracing::warn!(error = %e, path = %path, "Failed to record page view");
            }
        });
    }

    response
}

fn is_trackable<B>(path: &str, response: &Response<B>) -> bool {
    if SKIPPED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    if !response.status().is_success() {
        return false;
    }
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}
