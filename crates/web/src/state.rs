//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::resend::ResendError;
use crate::services::{LogoStorage, ResendClient, StorefrontService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    email: Option<ResendClient>,
    storefronts: StorefrontService,
    logos: LogoStorage,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the email client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, ResendError> {
        let email = config.email.as_ref().map(ResendClient::new).transpose()?;
        let logos = LogoStorage::new(config.upload_dir.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                storefronts: StorefrontService::new(),
                logos,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the email client, if email is configured.
    #[must_use]
    pub fn email(&self) -> Option<&ResendClient> {
        self.inner.email.as_ref()
    }

    /// Get the storefront cache.
    #[must_use]
    pub fn storefronts(&self) -> &StorefrontService {
        &self.inner.storefronts
    }

    /// Get the logo storage.
    #[must_use]
    pub fn logos(&self) -> &LogoStorage {
        &self.inner.logos
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::tests::test_config;

    /// State over a pool that never connects; for code paths that stop
    /// before touching the database.
    pub(crate) fn test_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/slipbook_test")
            .expect("valid database url");
        AppState::new(test_config(), pool).expect("state builds")
    }
}
