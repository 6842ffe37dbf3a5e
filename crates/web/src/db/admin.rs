//! Platform-wide queries for the admin back-office.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use slipbook_core::ProfileId;

use super::RepositoryError;

/// A business is "frequent" with at least this many receipts in the window.
pub const FREQUENT_RECEIPT_THRESHOLD: i64 = 5;

/// Headline platform numbers.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_receipts: i64,
    pub total_revenue: Decimal,
    /// Profiles with a name, phone and logo set.
    pub verified_businesses: i64,
}

/// Row in the admin user directory.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSummary {
    pub id: ProfileId,
    pub business_name: String,
    pub email: String,
    pub business_phone: Option<String>,
    pub slug: Option<String>,
    pub is_admin: bool,
    pub receipt_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A campaign recipient with the signals used for segmentation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampaignRecipient {
    pub id: ProfileId,
    pub business_name: String,
    pub auth_email: String,
    pub recent_receipts: i64,
    pub last_active: Option<DateTime<Utc>>,
}

impl CampaignRecipient {
    /// Issued at least [`FREQUENT_RECEIPT_THRESHOLD`] receipts recently.
    #[must_use]
    pub const fn is_frequent(&self) -> bool {
        self.recent_receipts >= FREQUENT_RECEIPT_THRESHOLD
    }

    /// No recorded page views at all.
    #[must_use]
    pub const fn is_inactive(&self) -> bool {
        self.last_active.is_none()
    }
}

/// Repository for admin analytics and user management.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Platform totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<PlatformStats, RepositoryError> {
        let stats = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM app.profile) AS total_users,
                (SELECT COUNT(*) FROM app.receipt) AS total_receipts,
                (SELECT COALESCE(SUM(total_amount), 0) FROM app.receipt) AS total_revenue,
                (SELECT COUNT(*) FROM app.profile
                 WHERE business_name <> '' AND business_name <> 'My Business'
                   AND COALESCE(business_phone, '') <> ''
                   AND COALESCE(logo_url, '') <> '') AS verified_businesses
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    /// Creation times of receipts issued since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn receipt_times_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let times = sqlx::query_scalar(
            "SELECT created_at FROM app.receipt WHERE created_at >= $1 ORDER BY created_at",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(times)
    }

    /// Signup times of profiles created since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn signup_times_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let times = sqlx::query_scalar(
            "SELECT created_at FROM app.profile WHERE created_at >= $1 ORDER BY created_at",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(times)
    }

    /// Profiles newest first, filtered by business name or ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserSummary>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let users = sqlx::query_as(
            r"
            SELECT p.id, p.business_name, a.email, p.business_phone, p.slug, p.is_admin,
                   (SELECT COUNT(*) FROM app.receipt r WHERE r.profile_id = p.id) AS receipt_count,
                   p.created_at
            FROM app.profile p
            JOIN app.account a ON a.id = p.id
            WHERE $1::text IS NULL
               OR p.business_name ILIKE $1
               OR p.id::text ILIKE $1
            ORDER BY p.created_at DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Every profile as a campaign recipient, with receipts issued since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn campaign_recipients(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<CampaignRecipient>, RepositoryError> {
        let recipients = sqlx::query_as(
            r"
            SELECT p.id, p.business_name, a.email AS auth_email,
                   (SELECT COUNT(*) FROM app.receipt r
                    WHERE r.profile_id = p.id AND r.created_at >= $1) AS recent_receipts,
                   (SELECT MAX(s.created_at) FROM app.site_activity s
                    WHERE s.user_id = p.id) AS last_active
            FROM app.profile p
            JOIN app.account a ON a.id = p.id
            ORDER BY p.created_at DESC
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(recipients)
    }
}

/// Escape `LIKE` wildcards in user input.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
