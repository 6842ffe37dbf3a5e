//! Admin back-office: platform overview, user directory and campaigns.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin).

pub mod campaigns;
pub mod overview;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(overview::show))
        .route("/users", get(users::index))
        .route("/campaigns", get(campaigns::show).post(campaigns::send))
        .route("/campaigns/preview", post(campaigns::preview))
}
