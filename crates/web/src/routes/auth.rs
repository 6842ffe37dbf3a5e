//! Authentication route handlers.
//!
//! Form posts redirect back with an `?error=` code on failure, which the
//! page maps to a message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use slipbook_core::profile::landing_route;

use crate::db::ProfileRepository;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH};
use crate::state::AppState;

/// Login and signup form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

impl MessageQuery {
    fn message(&self) -> Option<&'static str> {
        self.error.as_deref().map(error_message)
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<&'static str>,
    pub min_password_length: usize,
}

/// Human-readable message for an `?error=` code.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "email" => "Enter a valid email address.",
        "exists" => "An account with this email already exists. Try logging in.",
        "weak_password" => "Password must be at least 8 characters.",
        "session" => "We could not start your session. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/auth/callback").into_response();
    }
    LoginTemplate {
        error: query.message(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => start_session(&session, &user, "/auth/callback", "/login").await,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed: invalid credentials");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            Redirect::to("/login?error=server").into_response()
        }
    }
}

/// Display the signup page.
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/auth/callback").into_response();
    }
    SignupTemplate {
        error: query.message(),
        min_password_length: MIN_PASSWORD_LENGTH,
    }
    .into_response()
}

/// Handle signup form submission.
///
/// New accounts land on onboarding.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match AuthService::new(state.pool())
        .register(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Account created");
            start_session(&session, &user, "/onboarding", "/signup").await
        }
        Err(e) => {
            let code = match &e {
                AuthError::InvalidEmail(_) => "email",
                AuthError::UserAlreadyExists => "exists",
                AuthError::WeakPassword(_) => "weak_password",
                _ => {
                    tracing::error!(error = %e, "Signup failed");
                    "server"
                }
            };
            Redirect::to(&format!("/signup?error={code}")).into_response()
        }
    }
}

async fn start_session(
    session: &Session,
    user: &CurrentUser,
    success_path: &str,
    failure_path: &str,
) -> Response {
    if let Err(e) = set_current_user(session, user).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to(&format!("{failure_path}?error=session")).into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);
    Redirect::to(success_path).into_response()
}

/// Handle logout.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/login")
}

/// Send a signed-in user to admin, onboarding or the dashboard.
///
/// The admin flag is re-read from the profile so a grant takes effect on the
/// next visit without logging out.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut user): RequireAuth,
) -> Result<Redirect> {
    let profile = ProfileRepository::new(state.pool()).require(user.id).await?;

    if profile.is_admin != user.is_admin {
        user.is_admin = profile.is_admin;
        if let Err(e) = set_current_user(&session, &user).await {
            tracing::warn!(error = %e, "Failed to refresh session admin flag");
        }
    }

    Ok(Redirect::to(landing_route(
        user.is_admin,
        &profile.business_name,
    )))
}
