//! Site activity repository: page-view log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slipbook_core::ProfileId;
use slipbook_core::profile::session_bucket;

use super::RepositoryError;

/// One logged page view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageView {
    pub user_id: Option<ProfileId>,
    pub path: String,
    pub session_bucket: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for site activity.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a page view at `at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        user_id: Option<ProfileId>,
        path: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO app.site_activity (user_id, path, session_bucket, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id)
        .bind(path)
        .bind(session_bucket(at))
        .bind(at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Page views since `since`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn since(&self, since: DateTime<Utc>) -> Result<Vec<PageView>, RepositoryError> {
        let views = sqlx::query_as(
            r"
            SELECT user_id, path, session_bucket, created_at
            FROM app.site_activity
            WHERE created_at >= $1
            ORDER BY created_at
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(views)
    }
}
