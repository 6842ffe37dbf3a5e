//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLIPBOOK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SLIPBOOK_BASE_URL` - Public URL of the app, used in storefront links and emails
//! - `SLIPBOOK_SESSION_SECRET` - Session cookie signing secret (min 64 chars, high entropy)
//!
//! ## Optional
//! - `SLIPBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `SLIPBOOK_PORT` - Listen port (default: 3000)
//! - `SLIPBOOK_UPLOAD_DIR` - Where uploaded logos are written (default: uploads)
//! - `RESEND_API_KEY` - Resend API key (for campaign emails)
//! - `EMAIL_FROM` - Sender address for campaign emails
//! - `EMAIL_REPLY_TO` - Reply-to address for campaign emails
//! - `RESEND_API_BASE` - Resend API base URL (default: `https://api.resend.com`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// A cookie signing key is built from the first 64 bytes of the secret.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Resend API base URL used unless `RESEND_API_BASE` overrides it.
pub const DEFAULT_RESEND_API_BASE: &str = "https://api.resend.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Secret the session cookie signing key is built from
    pub session_secret: SecretString,
    /// Directory uploaded logos are stored in
    pub upload_dir: PathBuf,
    /// Campaign email delivery (optional - campaigns are disabled without it)
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Fraction of errors reported to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of requests traced
    pub sentry_traces_sample_rate: f32,
}

/// Resend configuration for campaign emails.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct EmailConfig {
    /// Resend API key
    pub api_key: SecretString,
    /// `From` header, e.g. `Slipbook <hello@slipbook.app>`
    pub from: String,
    /// Optional `Reply-To` address
    pub reply_to: Option<String>,
    /// API base URL, without trailing slash
    pub api_base: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"[REDACTED]")
            .field("from", &self.from)
            .field("reply_to", &self.reply_to)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = get_optional_env("RESEND_API_KEY");
        let from = get_optional_env("EMAIL_FROM");

        match (api_key, from) {
            (Some(key), Some(from)) => {
                validate_secret_strength(&key, "RESEND_API_KEY")?;
                Ok(Some(Self {
                    api_key: SecretString::from(key),
                    from,
                    reply_to: get_optional_env("EMAIL_REPLY_TO"),
                    api_base: get_env_or_default("RESEND_API_BASE", DEFAULT_RESEND_API_BASE)
                        .trim_end_matches('/')
                        .to_string(),
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "RESEND_API_KEY/EMAIL_FROM".to_string(),
                "Both RESEND_API_KEY and EMAIL_FROM must be set together".to_string(),
            )),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SLIPBOOK_DATABASE_URL")?;
        let host = get_env_or_default("SLIPBOOK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SLIPBOOK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SLIPBOOK_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SLIPBOOK_PORT".to_string(), e.to_string()))?;
        let base_url = normalize_base_url(&get_required_env("SLIPBOOK_BASE_URL")?)?;
        let session_secret = get_validated_secret("SLIPBOOK_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SLIPBOOK_SESSION_SECRET")?;
        let upload_dir = PathBuf::from(get_env_or_default("SLIPBOOK_UPLOAD_DIR", "uploads"));

        let email = EmailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            upload_dir,
            email,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute public URL of a storefront.
    #[must_use]
    pub fn storefront_url(&self, slug: &str) -> String {
        format!("{}/m/{}", self.base_url, urlencoding::encode(slug))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check the base URL parses as http(s) and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SLIPBOOK_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "SLIPBOOK_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Config for handler and service tests. Never touches the environment.
    pub(crate) fn test_config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/slipbook_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://slipbook.test".to_string(),
            session_secret: SecretString::from(
                "Zk8q2LmX9vB4nP7wR3tY6uJ1aS5dF0gHjK2lQ9wE4rT7yU1iO3pA6sD8fG0hJ5kL",
            ),
            upload_dir: PathBuf::from("uploads"),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("re_your-api-key-here", "RESEND_API_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength(&"z".repeat(40), "RESEND_API_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("re_Q7f2Lk9xPz3Vb8Nm1Wc4Rt6Yh0Jd5Gs", "RESEND_API_KEY").is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "S").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "S").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(64)), "S").is_ok());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://slipbook.app/").unwrap(),
            "https://slipbook.app"
        );
        assert!(normalize_base_url("ftp://slipbook.app").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr_and_https() {
        let config = test_config();
        assert_eq!(config.socket_addr().port(), 3000);
        assert!(config.is_https());
    }

    #[test]
    fn test_storefront_url_encodes_slug() {
        let config = test_config();
        assert_eq!(config.storefront_url("ada-bakes"), "https://slipbook.test/m/ada-bakes");
    }

    #[test]
    fn test_email_config_debug_redacts_key() {
        let config = EmailConfig {
            api_key: SecretString::from("re_super_private_value"),
            from: "Slipbook <hello@slipbook.app>".to_string(),
            reply_to: None,
            api_base: DEFAULT_RESEND_API_BASE.to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("hello@slipbook.app"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("re_super_private_value"));
    }
}
