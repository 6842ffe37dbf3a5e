//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct LandingTemplate {
    pub signed_in: bool,
}

/// Display the landing page.
pub async fn index(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    LandingTemplate {
        signed_in: user.is_some(),
    }
}
