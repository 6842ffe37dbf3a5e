//! Public storefront pages.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::services::storefront::Storefront;
use crate::state::AppState;

/// A business's public price list.
#[derive(Template, WebTemplate)]
#[template(path = "storefront/show.html")]
pub struct StorefrontTemplate {
    pub storefront: Arc<Storefront>,
}

/// Shown for slugs no business has claimed.
#[derive(Template, WebTemplate)]
#[template(path = "storefront/not_found.html")]
pub struct StorefrontNotFoundTemplate {
    pub slug: String,
}

/// Display the storefront for `slug`.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let storefront = state.storefronts().load(state.pool(), &slug).await?;

    Ok(match storefront {
        Some(storefront) => StorefrontTemplate { storefront }.into_response(),
        None => (StatusCode::NOT_FOUND, StorefrontNotFoundTemplate { slug }).into_response(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::tests::profile;

    #[test]
    fn test_empty_storefront_renders_placeholder() {
        let html = StorefrontTemplate {
            storefront: Arc::new(Storefront {
                profile: profile("Ada Bakes"),
                items: vec![],
            }),
        }
        .render()
        .expect("renders");
        assert!(html.contains("Ada Bakes | Official Price List"));
        assert!(html.contains("No Public Listings Available"));
    }

    #[test]
    fn test_not_found_page() {
        let html = StorefrontNotFoundTemplate {
            slug: "nobody".to_owned(),
        }
        .render()
        .expect("renders");
        assert!(html.contains("Storefront Not Found"));
    }
}
