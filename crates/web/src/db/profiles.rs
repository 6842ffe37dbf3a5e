//! Profile repository: business branding.

use sqlx::PgPool;

use slipbook_core::ProfileId;

use super::RepositoryError;
use crate::models::Profile;

const PROFILE_COLUMNS: &str = "id, business_name, business_phone, business_email, tagline, \
     address, footer_message, currency, logo_url, theme_color, slug, is_admin, created_at, updated_at";

/// Fields editable from the settings page.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub business_name: String,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub tagline: Option<String>,
    pub address: Option<String>,
    pub footer_message: Option<String>,
    pub currency: String,
    pub theme_color: String,
    pub slug: Option<String>,
    /// New logo URL; `None` keeps the current logo.
    pub logo_url: Option<String>,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let profile: Option<Profile> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM app.profile WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Current admin flag of a profile, or `None` if the profile is gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, id: ProfileId) -> Result<Option<bool>, RepositoryError> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT is_admin FROM app.profile WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(flag)
    }

    /// Get a profile by ID, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this ID.
    pub async fn require(&self, id: ProfileId) -> Result<Profile, RepositoryError> {
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Get the profile that owns a storefront slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Profile>, RepositoryError> {
        let profile: Option<Profile> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM app.profile WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Save the onboarding answers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn complete_onboarding(
        &self,
        id: ProfileId,
        business_name: &str,
        business_phone: Option<&str>,
        currency: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE app.profile
            SET business_name = $2, business_phone = $3, currency = $4, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(business_name)
        .bind(business_phone)
        .bind(currency)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Save the settings form and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another profile already uses the slug.
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn update(
        &self,
        id: ProfileId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as(&format!(
            r"
            UPDATE app.profile
            SET business_name = $2,
                business_phone = $3,
                business_email = $4,
                tagline = $5,
                address = $6,
                footer_message = $7,
                currency = $8,
                theme_color = $9,
                slug = $10,
                logo_url = COALESCE($11, logo_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.business_name)
        .bind(&update.business_phone)
        .bind(&update.business_email)
        .bind(&update.tagline)
        .bind(&update.address)
        .bind(&update.footer_message)
        .bind(&update.currency)
        .bind(&update.theme_color)
        .bind(&update.slug)
        .bind(&update.logo_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "storefront link"))?
        .ok_or(RepositoryError::NotFound)
    }
}
