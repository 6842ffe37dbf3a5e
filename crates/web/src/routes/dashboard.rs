//! Owner dashboard: headline numbers, recent receipts and a weekly chart.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use slipbook_core::analytics::{SalesSummary, Sample, daily_series};

use super::{ChartBar, NavView, chart_bars};
use crate::db::{ProfileRepository, ReceiptRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Profile, Receipt};
use crate::state::AppState;

/// Number of receipts in the recent list.
const RECENT_RECEIPTS: i64 = 5;

/// Days shown on the sales chart.
const CHART_DAYS: u32 = 7;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub profile: Profile,
    pub summary: SalesSummary,
    pub recent: Vec<Receipt>,
    pub chart: Vec<ChartBar>,
    pub storefront_url: Option<String>,
}

/// Display the dashboard.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<DashboardTemplate> {
    let profiles = ProfileRepository::new(state.pool());
    let receipts = ReceiptRepository::new(state.pool());

    let (profile, sales, recent) = tokio::try_join!(
        profiles.require(user.id),
        receipts.sales(user.id),
        receipts.list(user.id, Some(RECENT_RECEIPTS)),
    )?;

    let summary = SalesSummary::from_receipts(
        sales
            .iter()
            .map(|sale| (sale.customer_name.as_str(), sale.total_amount)),
    );
    let samples: Vec<Sample> = sales
        .iter()
        .map(|sale| Sample::new(sale.created_at, sale.total_amount))
        .collect();
    let chart = chart_bars(
        daily_series(&samples, Utc::now().date_naive(), CHART_DAYS)
            .into_iter()
            .map(|bucket| (bucket.label, bucket.amount)),
    );

    let storefront_url = profile
        .slug
        .as_deref()
        .map(|slug| state.config().storefront_url(slug));

    Ok(DashboardTemplate {
        nav: NavView::new("dashboard", &user),
        profile,
        summary,
        recent,
        chart,
        storefront_url,
    })
}
