//! JSON API for the back-office.

pub mod campaigns;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Build the API router, nested under `/api/admin`.
///
/// Other methods on these paths get axum's default 405.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dispatch-campaign", post(campaigns::dispatch))
}
