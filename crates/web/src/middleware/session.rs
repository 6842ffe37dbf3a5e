//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session id
//! cookie is signed with a key derived from `SLIPBOOK_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{AppConfig, ConfigError};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "slipbook_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookie signing key built from the configured session secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is shorter than the
/// 64 bytes a signing key needs.
pub fn session_key(config: &AppConfig) -> Result<Key, ConfigError> {
    Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("SLIPBOOK_SESSION_SECRET".to_string(), e.to_string())
    })
}

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by the initial migration.
///
/// # Errors
///
/// Returns `ConfigError` if no signing key can be built from the secret.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, ConfigError> {
    let store = PostgresStore::new(pool.clone());

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(session_key(config)?))
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_session_key_from_configured_secret() {
        let config = test_config();
        assert!(session_key(&config).is_ok());
    }

    #[test]
    fn test_short_secret_cannot_sign() {
        let mut config = test_config();
        config.session_secret = SecretString::from("Zk8q2LmX9vB4nP7wR3tY6uJ1aS5dF0gH");
        let err = session_key(&config).expect_err("too short");
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_secrets_yield_distinct_keys() {
        let mut other = test_config();
        other.session_secret = SecretString::from("Q".repeat(32) + &"w".repeat(32));
        let a = session_key(&test_config()).expect("key");
        let b = session_key(&other).expect("key");
        assert_ne!(a.signing(), b.signing());
    }
}
