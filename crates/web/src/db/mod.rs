//! Database operations for Slipbook `PostgreSQL`.
//!
//! ## Tables (schema `app`)
//!
//! - `account` - Login identity (email + argon2 hash)
//! - `profile` - Business branding, one per account, same id
//! - `receipt` - Issued receipts with JSONB line items
//! - `menu_item` - Public price list entries
//! - `site_activity` - Page-view log for admin analytics
//!
//! Sessions live in `tower_sessions.session`, owned by `tower-sessions-sqlx-store`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p slipbook-cli -- migrate
//! ```

pub mod accounts;
pub mod activity;
pub mod admin;
pub mod menu;
pub mod profiles;
pub mod receipts;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use activity::ActivityRepository;
pub use admin::AdminRepository;
pub use menu::MenuRepository;
pub use profiles::ProfileRepository;
pub use receipts::ReceiptRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
