//! Resend API client for transactional and campaign email.
//!
//! # API Reference
//!
//! - Base URL: `https://api.resend.com` (configurable through [`EmailConfig::api_base`])
//! - Authentication: `Authorization: Bearer <key>`
//! - Batch endpoint: `POST /emails/batch`, at most [`BATCH_LIMIT`] messages per call

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmailConfig;

/// Maximum number of messages accepted by one batch call.
pub const BATCH_LIMIT: usize = 100;

/// Errors that can occur when interacting with the Resend API.
#[derive(Debug, Error)]
pub enum ResendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Resend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// More messages than one batch call accepts.
    #[error("batch of {0} messages exceeds the limit of {BATCH_LIMIT}")]
    BatchTooLarge(usize),
}

/// One outgoing message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    data: Vec<SentEmail>,
}

/// Provider ID of an accepted message.
#[derive(Debug, Clone, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendClient {
    inner: Arc<ResendClientInner>,
}

struct ResendClientInner {
    client: reqwest::Client,
    api_base: String,
    from: String,
    reply_to: Option<String>,
}

impl ResendClient {
    /// Create a new Resend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, ResendError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ResendError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ResendClientInner {
                client,
                api_base: config.api_base.clone(),
                from: config.from.clone(),
                reply_to: config.reply_to.clone(),
            }),
        })
    }

    /// Sender address used for every message.
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.inner.from
    }

    /// Reply-to address, if configured.
    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.inner.reply_to.as_deref()
    }

    /// Send up to [`BATCH_LIMIT`] messages in one call.
    ///
    /// # Errors
    ///
    /// Returns `ResendError::BatchTooLarge` without calling the API when
    /// `emails` exceeds the limit, otherwise any request or API error.
    pub async fn send_batch(&self, emails: &[OutgoingEmail]) -> Result<Vec<SentEmail>, ResendError> {
        if emails.len() > BATCH_LIMIT {
            return Err(ResendError::BatchTooLarge(emails.len()));
        }
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/emails/batch", self.inner.api_base);
        let response = self.inner.client.post(&url).json(emails).send().await?;
        let batch: BatchResponse = Self::handle_response(response).await?;
        Ok(batch.data)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ResendError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ResendError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse error response from the Resend API.
    async fn parse_error(response: reqwest::Response) -> ResendError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ResendError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return ResendError::Unauthorized;
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ResendError::Api { status, message }
    }
}

impl std::fmt::Debug for ResendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendClient")
            .field("api_base", &self.inner.api_base)
            .field("from", &self.inner.from)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::DEFAULT_RESEND_API_BASE;

    fn client() -> ResendClient {
        ResendClient::new(&EmailConfig {
            api_key: SecretString::from("re_Zk8q2LmX9vB4nP7wR3tY6uJ1"),
            from: "Slipbook <hello@slipbook.test>".to_owned(),
            reply_to: None,
            api_base: DEFAULT_RESEND_API_BASE.to_owned(),
        })
        .expect("client builds")
    }

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: "Slipbook <hello@slipbook.test>".to_owned(),
            to: vec![to.to_owned()],
            subject: "Hi".to_owned(),
            html: "<p>Hi</p>".to_owned(),
            text: None,
            reply_to: None,
        }
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("hello@slipbook.test"));
        assert!(!debug.contains("re_Zk8q"));
    }

    #[test]
    fn test_outgoing_email_omits_empty_optionals() {
        let json = serde_json::to_value(email("ada@example.ng")).expect("serializes");
        assert_eq!(json["to"][0], "ada@example.ng");
        assert!(json.get("text").is_none());
        assert!(json.get("reply_to").is_none());
    }

    #[tokio::test]
    async fn test_send_batch_rejects_oversized_batch_without_calling_api() {
        let emails = vec![email("a@b.c"); BATCH_LIMIT + 1];
        let err = client().send_batch(&emails).await.expect_err("too large");
        assert!(matches!(err, ResendError::BatchTooLarge(101)));
    }

    #[tokio::test]
    async fn test_send_batch_empty_is_noop() {
        let sent = client().send_batch(&[]).await.expect("empty batch");
        assert!(sent.is_empty());
    }
}
