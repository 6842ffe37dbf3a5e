//! Back-office access management.
//!
//! Accounts sign up through the web app; this only flips the admin flag on
//! the profile that belongs to an existing account.

use secrecy::SecretString;
use slipbook_core::Email;
use slipbook_web::db::{self, AccountRepository, RepositoryError};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account uses this email.
    #[error("No account found with email: {0}")]
    UnknownAccount(String),

    /// Repository failure.
    #[error("{0}")]
    Repository(RepositoryError),
}

/// Grant or revoke back-office access for an account.
///
/// # Errors
///
/// Returns an error if the email is malformed, the account does not
/// exist, or the database is unreachable.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("SLIPBOOK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&SecretString::from(database_url)).await?;

    match AccountRepository::new(&pool).set_admin(&email, is_admin).await {
        Ok(()) => {
            let action = if is_admin { "granted to" } else { "revoked from" };
            tracing::info!("Admin access {action} {email}");
            Ok(())
        }
        Err(RepositoryError::NotFound) => Err(AdminError::UnknownAccount(email.into_inner())),
        Err(RepositoryError::Database(e)) => Err(AdminError::Database(e)),
        Err(other) => Err(AdminError::Repository(other)),
    }
}
