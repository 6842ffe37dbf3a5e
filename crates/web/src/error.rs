//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::campaign::CampaignError;
use crate::services::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Campaign rendering or delivery failed.
    #[error("Campaign error: {0}")]
    Campaign(#[from] CampaignError),

    /// Upload could not be stored.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is our fault and should reach Sentry.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(RepositoryError::NotFound | RepositoryError::Conflict(_))
            | Self::Campaign(CampaignError::Invalid(_))
            | Self::Storage(
                StorageError::UnsupportedType(_) | StorageError::TooLarge(_) | StorageError::Empty,
            ) => false,
            Self::Database(_)
            | Self::Campaign(_)
            | Self::Storage(_)
            | Self::Template(_)
            | Self::Internal(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Repository(_) | AuthError::PasswordHash),
            _ => false,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Campaign(CampaignError::Invalid(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Campaign(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(StorageError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(StorageError::UnsupportedType(_) | StorageError::Empty) => {
                StatusCode::BAD_REQUEST
            }
            Self::Storage(StorageError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Campaign(CampaignError::Invalid(msg)) => msg.clone(),
            Self::Campaign(err) => err.to_string(),
            Self::Storage(StorageError::Io(_)) => "Could not save the upload".to_string(),
            Self::Storage(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            _ => self.to_string(),
        }
    }

    /// Render this error as `{"error": ...}` for JSON endpoints.
    pub fn into_json_response(self) -> Response {
        self.report();
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }

    fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        // Don't expose internal error details to clients
        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("receipt", "Saved receipt", Some(&[("receipt_number", "007")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("receipt-123".to_string());
        assert_eq!(err.to_string(), "Not found: receipt-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "storefront link already exists".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).public_message(),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("db password is hunter2".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_campaign_validation_is_bad_request() {
        let err = AppError::Campaign(CampaignError::Invalid("Subject is required".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Subject is required");
    }

    #[tokio::test]
    async fn test_json_response_shape() {
        let response =
            AppError::BadRequest("Select at least one recipient".to_string()).into_json_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "Bad request: Select at least one recipient");
    }
}
