//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Landing page
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action (rate limited)
//! GET  /signup                  - Signup page
//! POST /signup                  - Signup action (rate limited)
//! POST /logout                  - Logout action
//! GET  /auth/callback           - Route a signed-in user to their landing page
//!
//! # Owner pages (requires auth)
//! GET  /onboarding              - Business name, phone and currency
//! POST /onboarding
//! GET  /dashboard               - Sales stats, recent receipts, 7-day chart
//! GET  /generate                - Receipt generator
//! POST /generate/preview        - Re-render the generator with a live preview
//! POST /generate                - Save a receipt
//! GET  /receipts/{id}           - Branded receipt page
//! GET  /history                 - Receipt history with search
//! POST /history/{id}/delete     - Delete a receipt
//! GET  /settings                - Profile and price list
//! POST /settings/profile        - Save profile (multipart, optional logo)
//! POST /settings/menu           - Save price list
//! POST /settings/menu/{id}/delete - Delete a price list item
//!
//! # Public
//! GET  /m/{slug}                - Public storefront
//!
//! # Admin (requires admin)
//! GET  /admin                   - Platform overview
//! GET  /admin/users             - User directory
//! GET  /admin/campaigns         - Campaign composer
//! POST /admin/campaigns/preview - Preview the email for the first recipient
//! POST /admin/campaigns         - Send a campaign
//!
//! # API (requires admin)
//! POST /api/admin/dispatch-campaign - Send a campaign (JSON)
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod dashboard;
pub mod generator;
pub mod history;
pub mod home;
pub mod onboarding;
pub mod settings;
pub mod storefront;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::middleware::auth_rate_limiter;
use crate::models::CurrentUser;
use crate::services::storage::MAX_LOGO_BYTES;
use crate::state::AppState;

/// Body limit for the settings form: one logo plus the text fields.
const PROFILE_FORM_LIMIT: usize = MAX_LOGO_BYTES + 64 * 1024;

/// Navigation state shared by every signed-in page.
#[derive(Debug, Clone)]
pub struct NavView {
    /// Which top-level section is highlighted.
    pub active: &'static str,
    pub email: String,
    pub is_admin: bool,
}

impl NavView {
    #[must_use]
    pub fn new(active: &'static str, user: &CurrentUser) -> Self {
        Self {
            active,
            email: user.email.to_string(),
            is_admin: user.is_admin,
        }
    }
}

/// One bar of a server-rendered bar chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub label: String,
    pub value: Decimal,
    /// Bar height as a percentage of the tallest bar.
    pub height: u32,
}

/// Scale `(label, value)` pairs against the largest value.
///
/// All-zero input yields zero-height bars.
#[must_use]
pub fn chart_bars(points: impl IntoIterator<Item = (String, Decimal)>) -> Vec<ChartBar> {
    let points: Vec<(String, Decimal)> = points.into_iter().collect();
    let max = points
        .iter()
        .map(|(_, value)| *value)
        .max()
        .unwrap_or(Decimal::ZERO);

    points
        .into_iter()
        .map(|(label, value)| {
            let height = if max > Decimal::ZERO && value > Decimal::ZERO {
                (value * Decimal::ONE_HUNDRED / max)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            } else {
                0
            };
            ChartBar {
                label,
                value,
                height,
            }
        })
        .collect()
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/auth/callback", get(auth::callback))
}

/// Create the owner page routes router.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/onboarding",
            get(onboarding::show).post(onboarding::submit),
        )
        .route("/dashboard", get(dashboard::show))
        .route("/generate", get(generator::new).post(generator::create))
        .route("/generate/preview", post(generator::preview))
        .route("/receipts/{id}", get(generator::show))
        .route("/history", get(history::index))
        .route("/history/{id}/delete", post(history::delete))
        .route("/settings", get(settings::show))
        .route(
            "/settings/profile",
            post(settings::save_profile).layer(DefaultBodyLimit::max(PROFILE_FORM_LIMIT)),
        )
        .route("/settings/menu", post(settings::save_menu))
        .route("/settings/storefront-qr.svg", get(settings::storefront_qr))
        .route("/settings/menu/{id}/delete", post(settings::delete_menu_item))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(auth_routes())
        .merge(owner_routes())
        .route("/m/{slug}", get(storefront::show))
        .nest("/admin", admin::routes())
        .nest("/api/admin", api::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_bars_scale_to_max() {
        let bars = chart_bars([
            ("Mon".to_owned(), Decimal::from(50)),
            ("Tue".to_owned(), Decimal::from(200)),
            ("Wed".to_owned(), Decimal::ZERO),
        ]);
        let heights: Vec<u32> = bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![25, 100, 0]);
    }

    #[test]
    fn test_chart_bars_all_zero() {
        let bars = chart_bars([("Mon".to_owned(), Decimal::ZERO)]);
        assert_eq!(bars[0].height, 0);
    }
}
