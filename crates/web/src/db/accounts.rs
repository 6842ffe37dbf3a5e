//! Account repository: login identities.

use sqlx::PgPool;

use slipbook_core::profile::{DEFAULT_BUSINESS_NAME, DEFAULT_THEME_COLOR};
use slipbook_core::money::DEFAULT_CURRENCY;
use slipbook_core::{Email, ProfileId};

use super::RepositoryError;

/// Stored login data for one account.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub id: ProfileId,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: ProfileId,
    email: String,
    password_hash: String,
    is_admin: bool,
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and its default profile in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_profile(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<ProfileId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ProfileId = sqlx::query_scalar(
            r"
            INSERT INTO app.account (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email"))?;

        sqlx::query(
            r"
            INSERT INTO app.profile (id, business_name, business_email, currency, theme_color)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(DEFAULT_BUSINESS_NAME)
        .bind(email)
        .bind(DEFAULT_CURRENCY)
        .bind(DEFAULT_THEME_COLOR)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Look up login data by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        let row: Option<CredentialsRow> = sqlx::query_as(
            r"
            SELECT a.id, a.email, a.password_hash, p.is_admin
            FROM app.account a
            JOIN app.profile p ON p.id = a.id
            WHERE a.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let email = Email::parse(&r.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
            Ok(AccountCredentials {
                id: r.id,
                email,
                password_hash: r.password_hash,
                is_admin: r.is_admin,
            })
        })
        .transpose()
    }

    /// Set or clear the admin flag for the account with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE app.profile p
            SET is_admin = $2, updated_at = now()
            FROM app.account a
            WHERE a.id = p.id AND a.email = $1
            ",
        )
        .bind(email)
        .bind(is_admin)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
