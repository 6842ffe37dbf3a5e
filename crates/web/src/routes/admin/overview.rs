//! Platform overview.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{DateTime, Days, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use slipbook_core::analytics::{Sample, bucket_by_hour, daily_series};

use crate::db::activity::PageView;
use crate::db::admin::PlatformStats;
use crate::db::{ActivityRepository, AdminRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::{ChartBar, NavView, chart_bars};
use crate::state::AppState;

/// Days covered by the trend charts and the activity breakdown.
const TREND_DAYS: u32 = 7;

/// Admin overview template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/overview.html")]
pub struct OverviewTemplate {
    pub nav: NavView,
    pub stats: PlatformStats,
    pub receipt_trend: Vec<ChartBar>,
    pub signup_trend: Vec<ChartBar>,
    pub hourly_activity: Vec<ChartBar>,
    pub page_views: usize,
    pub sessions: usize,
}

/// Display platform totals and seven-day trends.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<OverviewTemplate> {
    let today = Utc::now().date_naive();
    let since = today
        .checked_sub_days(Days::new(u64::from(TREND_DAYS - 1)))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or_else(Utc::now, |start| start.and_utc());

    let admin = AdminRepository::new(state.pool());
    let activity = ActivityRepository::new(state.pool());
    let (stats, receipt_times, signup_times, views) = tokio::try_join!(
        admin.stats(),
        admin.receipt_times_since(since),
        admin.signup_times_since(since),
        activity.since(since),
    )?;

    let trend = |times: &[DateTime<Utc>]| {
        let samples = count_samples(times.iter().copied());
        chart_bars(
            daily_series(&samples, today, TREND_DAYS)
                .into_iter()
                .map(|bucket| (bucket.label, Decimal::from(bucket.count))),
        )
    };

    Ok(OverviewTemplate {
        nav: NavView::new("admin", &user),
        stats,
        receipt_trend: trend(receipt_times.as_slice()),
        signup_trend: trend(signup_times.as_slice()),
        hourly_activity: hourly_activity(&views),
        page_views: views.len(),
        sessions: distinct_sessions(&views),
    })
}

/// One unit-weight sample per timestamp, so bucket amounts are counts.
fn count_samples(times: impl Iterator<Item = DateTime<Utc>>) -> Vec<Sample> {
    times.map(|at| Sample::new(at, Decimal::ONE)).collect()
}

fn hourly_activity(views: &[PageView]) -> Vec<ChartBar> {
    let samples = count_samples(views.iter().map(|view| view.created_at));
    chart_bars(
        bucket_by_hour(&samples)
            .into_iter()
            .map(|bucket| (format!("{:02}:00", bucket.hour), Decimal::from(bucket.count))),
    )
}

/// Visits, counted as distinct (user, hour bucket) pairs.
fn distinct_sessions(views: &[PageView]) -> usize {
    views
        .iter()
        .map(|view| (view.user_id, view.session_bucket.as_str()))
        .collect::<HashSet<_>>()
        .len()
}
