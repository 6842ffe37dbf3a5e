//! Authentication extractors.
//!
//! Owner pages use [`RequireAuth`]; the back-office and the dispatch API use
//! [`RequireAdmin`]. Both read [`CurrentUser`] from the tower-sessions
//! `Session` placed in request extensions by the session layer.
//! [`RequireAdmin`] also re-reads the admin flag from the database, so a
//! revoked admin loses access on their next request.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::ProfileRepository;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Login page that unauthenticated page requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a request lacks the required session.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in but not an admin.
    Forbidden,
    /// The admin flag could not be read.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            Self::Unavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Full request path, including any prefix a nested router stripped.
fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.path())
}

/// Rejection for a missing session, depending on whether the caller is an API client.
fn missing_session(parts: &Parts) -> AuthRejection {
    if request_path(parts).starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| missing_session(parts))
    }
}

/// Apply the stored admin flag to a session user.
///
/// A missing profile counts as not an admin.
fn apply_admin_flag(mut user: CurrentUser, stored: Option<bool>) -> Result<CurrentUser, AuthRejection> {
    user.is_admin = stored.unwrap_or(false);
    if user.is_admin {
        Ok(user)
    } else {
        Err(AuthRejection::Forbidden)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_user = session_user(parts)
            .await
            .ok_or_else(|| missing_session(parts))?;
        let cached = session_user.is_admin;
        let user_id = session_user.id;

        let stored = ProfileRepository::new(state.pool())
            .is_admin(user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %user_id, "Admin flag lookup failed");
                AuthRejection::Unavailable
            })?;

        let checked = apply_admin_flag(session_user.clone(), stored);
        if stored != Some(cached) {
            // Keep the session in step so the nav stops offering the back-office
            let mut refreshed = session_user;
            refreshed.is_admin = stored.unwrap_or(false);
            if let Some(session) = parts.extensions.get::<Session>()
                && let Err(e) = session.insert(session_keys::CURRENT_USER, &refreshed).await
            {
                tracing::warn!(error = %e, "Failed to refresh admin flag in session");
            }
        }

        checked.map(Self).inspect_err(|_| {
            tracing::warn!(user_id = %user_id, path = %request_path(parts), "Non-admin denied");
        })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Helper to set the current user in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::state::tests::test_state;

    fn parts(path: &str) -> Parts {
        Request::builder()
            .uri(path)
            .body(())
            .expect("request")
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_require_auth_redirects_pages_without_session() {
        let mut parts = parts("/dashboard");
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .expect("rejected");
        assert_eq!(rejection, AuthRejection::RedirectToLogin);

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_api_paths_get_unauthorized() {
        let mut parts = parts("/api/admin/dispatch-campaign");
        let rejection = RequireAdmin::from_request_parts(&mut parts, &test_state())
            .await
            .err()
            .expect("rejected");
        assert_eq!(rejection, AuthRejection::Unauthorized);
    }

    #[tokio::test]
    async fn test_nested_api_route_uses_original_uri() {
        let mut parts = parts("/dispatch-campaign");
        parts.extensions.insert(OriginalUri(
            "/api/admin/dispatch-campaign".parse().expect("uri"),
        ));
        let rejection = RequireAdmin::from_request_parts(&mut parts, &test_state())
            .await
            .err()
            .expect("rejected");
        assert_eq!(rejection, AuthRejection::Unauthorized);
    }

    fn session_admin() -> CurrentUser {
        CurrentUser {
            id: slipbook_core::ProfileId::random(),
            email: slipbook_core::Email::parse("ops@slipbook.test").expect("email"),
            is_admin: true,
        }
    }

    #[test]
    fn test_revoked_admin_is_forbidden_despite_session_flag() {
        let rejection = apply_admin_flag(session_admin(), Some(false)).expect_err("revoked");
        assert_eq!(rejection, AuthRejection::Forbidden);
    }

    #[test]
    fn test_deleted_profile_is_forbidden() {
        let rejection = apply_admin_flag(session_admin(), None).expect_err("no profile");
        assert_eq!(rejection, AuthRejection::Forbidden);
    }

    #[test]
    fn test_promoted_user_is_admitted_before_relogin() {
        let mut user = session_admin();
        user.is_admin = false;
        let user = apply_admin_flag(user, Some(true)).expect("granted");
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_optional_auth_without_session_is_none() {
        let mut parts = parts("/");
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .expect("infallible");
        assert!(user.is_none());
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::Unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
