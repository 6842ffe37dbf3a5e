//! User directory.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::AdminRepository;
use crate::db::admin::UserSummary;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::NavView;
use crate::state::AppState;

/// Directory search query.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub q: String,
}

/// User directory template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub nav: NavView,
    pub query: String,
    pub users: Vec<UserSummary>,
}

/// List profiles, newest first, filtered by business name or id.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<UsersQuery>,
) -> Result<UsersTemplate> {
    let term = query.q.trim();
    let users = AdminRepository::new(state.pool())
        .list_users((!term.is_empty()).then_some(term))
        .await?;

    Ok(UsersTemplate {
        nav: NavView::new("admin", &user),
        query: term.to_owned(),
        users,
    })
}
