//! Profile settings and the storefront price list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use slipbook_core::MenuItemId;
use slipbook_core::money::{DEFAULT_CURRENCY, parse_lenient};
use slipbook_core::profile::{DEFAULT_THEME_COLOR, is_hex_color, normalize_slug};

use super::NavView;
use crate::db::profiles::ProfileUpdate;
use crate::db::{MenuRepository, ProfileRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::menu::MenuItemDraft;
use crate::models::{CurrentUser, MenuItem, Profile};
use crate::services::qr::storefront_qr_svg;
use crate::state::AppState;

/// Slug collision message shown above the profile form.
const SLUG_TAKEN: &str = "That storefront link is already taken. Try another.";

/// Status banners selected by `?saved=`.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub saved: Option<String>,
}

impl SettingsQuery {
    fn notice(&self) -> Option<&'static str> {
        match self.saved.as_deref()? {
            "profile" => Some("Profile saved."),
            "menu" => Some("Price list saved."),
            _ => None,
        }
    }
}

/// Editable profile fields as shown in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub business_name: String,
    pub business_phone: String,
    pub business_email: String,
    pub tagline: String,
    pub address: String,
    pub footer_message: String,
    pub currency: String,
    pub theme_color: String,
    pub slug: String,
    pub logo_url: Option<String>,
}

impl ProfileForm {
    fn from_profile(profile: &Profile) -> Self {
        Self {
            business_name: profile.business_name.clone(),
            business_phone: profile.business_phone.clone().unwrap_or_default(),
            business_email: profile.business_email.clone().unwrap_or_default(),
            tagline: profile.tagline.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            footer_message: profile.footer_message.clone().unwrap_or_default(),
            currency: profile.currency.clone(),
            theme_color: profile.theme_color.clone(),
            slug: profile.slug.clone().unwrap_or_default(),
            logo_url: profile.logo_url.clone(),
        }
    }

    /// Set a text field by its form name. Unknown names are ignored.
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "business_name" => &mut self.business_name,
            "business_phone" => &mut self.business_phone,
            "business_email" => &mut self.business_email,
            "tagline" => &mut self.tagline,
            "address" => &mut self.address,
            "footer_message" => &mut self.footer_message,
            "currency" => &mut self.currency,
            "theme_color" => &mut self.theme_color,
            "slug" => &mut self.slug,
            _ => return,
        };
        *slot = value;
    }

    /// Normalize the submitted values into a repository update.
    fn to_update(&self, logo_url: Option<String>) -> ProfileUpdate {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        };
        let slug = normalize_slug(&self.slug);
        let currency = self.currency.trim();
        let theme_color = self.theme_color.trim();

        ProfileUpdate {
            business_name: self.business_name.trim().to_owned(),
            business_phone: optional(&self.business_phone),
            business_email: optional(&self.business_email),
            tagline: optional(&self.tagline),
            address: optional(&self.address),
            footer_message: optional(&self.footer_message),
            currency: if currency.is_empty() {
                DEFAULT_CURRENCY.to_owned()
            } else {
                currency.to_owned()
            },
            theme_color: if is_hex_color(theme_color) {
                theme_color.to_owned()
            } else {
                DEFAULT_THEME_COLOR.to_owned()
            },
            slug: (!slug.is_empty()).then_some(slug),
            logo_url,
        }
    }
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub nav: NavView,
    pub form: ProfileForm,
    pub items: Vec<MenuItem>,
    pub storefront_url: Option<String>,
    pub error: Option<String>,
    pub notice: Option<&'static str>,
}

/// Display the profile form and price list.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<SettingsQuery>,
) -> Result<SettingsTemplate> {
    let profiles = ProfileRepository::new(state.pool());
    let menu = MenuRepository::new(state.pool());
    let (profile, items) = tokio::try_join!(profiles.require(user.id), menu.list(user.id))?;

    Ok(SettingsTemplate {
        nav: NavView::new("settings", &user),
        storefront_url: storefront_url(&state, profile.slug.as_deref()),
        form: ProfileForm::from_profile(&profile),
        items,
        error: None,
        notice: query.notice(),
    })
}

/// Save the profile form, storing a new logo if one was chosen.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Response> {
    let profiles = ProfileRepository::new(state.pool());
    let current = profiles.require(user.id).await?;

    let mut form = ProfileForm::default();
    let mut logo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "logo" {
            let chosen = field.file_name().is_some_and(|f| !f.is_empty());
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if chosen && !bytes.is_empty() {
                logo = Some((content_type, bytes.to_vec()));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.set(&name, value);
        }
    }

    if form.business_name.trim().is_empty() {
        let error = "Business name is required.";
        return Ok(rerender(&state, &user, form, error, StatusCode::BAD_REQUEST).await);
    }

    let logo_url = match logo {
        Some((content_type, bytes)) => Some(
            state
                .logos()
                .store_logo(user.id, &content_type, &bytes)
                .await?,
        ),
        None => None,
    };

    let update = form.to_update(logo_url);
    let saved = match profiles.update(user.id, &update).await {
        Ok(profile) => profile,
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!(slug = ?update.slug, "Storefront link already taken");
            return Ok(rerender(&state, &user, form, SLUG_TAKEN, StatusCode::CONFLICT).await);
        }
        Err(e) => return Err(e.into()),
    };

    invalidate_slugs(&state, current.slug.as_deref(), saved.slug.as_deref()).await;
    tracing::info!("Profile saved");
    Ok(Redirect::to("/settings?saved=profile").into_response())
}

/// Re-render the settings page with the submitted values and an error.
async fn rerender(
    state: &AppState,
    user: &CurrentUser,
    mut form: ProfileForm,
    error: &str,
    status: StatusCode,
) -> Response {
    let menus = MenuRepository::new(state.pool());
    let profiles = ProfileRepository::new(state.pool());
    let (items, current) = tokio::join!(menus.list(user.id), profiles.get(user.id));
    let current = current.ok().flatten();
    form.logo_url = current.as_ref().and_then(|p| p.logo_url.clone());

    let template = SettingsTemplate {
        nav: NavView::new("settings", user),
        storefront_url: storefront_url(state, current.as_ref().and_then(|p| p.slug.as_deref())),
        form,
        items: items.unwrap_or_default(),
        error: Some(error.to_owned()),
        notice: None,
    };
    (status, template).into_response()
}

/// Save the price list.
///
/// Rows arrive as repeated `item_id` / `item_name` / `item_price` /
/// `item_description` fields; rows with a blank name are skipped.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_menu(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let drafts = menu_drafts(pairs)?;

    MenuRepository::new(state.pool())
        .sync(user.id, &drafts)
        .await?;
    invalidate_own_storefront(&state, &user).await?;

    tracing::info!(items = drafts.len(), "Price list saved");
    Ok(Redirect::to("/settings?saved=menu"))
}

/// Remove one item from the price list.
#[instrument(skip_all, fields(user_id = %user.id, item_id = %id))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<MenuItemId>,
) -> Result<Redirect> {
    MenuRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    invalidate_own_storefront(&state, &user).await?;
    Ok(Redirect::to("/settings?saved=menu"))
}

/// QR code for the signed-in owner's storefront, as an SVG image.
///
/// Responds 404 until a storefront slug has been set.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn storefront_qr(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let profile = ProfileRepository::new(state.pool())
        .require(user.id)
        .await?;
    let url = storefront_url(&state, profile.slug.as_deref())
        .ok_or_else(|| AppError::NotFound("storefront slug".to_string()))?;
    let svg = storefront_qr_svg(&url).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(svg_response(svg))
}

fn svg_response(svg: String) -> Response {
    (
        [
            (CONTENT_TYPE, "image/svg+xml"),
            (CACHE_CONTROL, "private, no-cache"),
        ],
        svg,
    )
        .into_response()
}

/// Zip repeated price list fields into drafts.
fn menu_drafts(pairs: Vec<(String, String)>) -> Result<Vec<MenuItemDraft>> {
    let mut ids = Vec::new();
    let mut names = Vec::new();
    let mut prices = Vec::new();
    let mut descriptions = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "item_id" => ids.push(value),
            "item_name" => names.push(value),
            "item_price" => prices.push(value),
            "item_description" => descriptions.push(value),
            _ => {}
        }
    }

    let mut drafts = Vec::with_capacity(names.len());
    for (index, name) in names.into_iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let id = match ids.get(index).map(|id| id.trim()).filter(|id| !id.is_empty()) {
            Some(raw) => Some(
                raw.parse::<MenuItemId>()
                    .map_err(|_| AppError::BadRequest(format!("invalid item id: {raw}")))?,
            ),
            None => None,
        };
        let description = descriptions
            .get(index)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        drafts.push(MenuItemDraft {
            id,
            name: name.to_owned(),
            price: parse_lenient(prices.get(index).map_or("", String::as_str)),
            description,
        });
    }
    Ok(drafts)
}

fn storefront_url(state: &AppState, slug: Option<&str>) -> Option<String> {
    slug.map(|slug| state.config().storefront_url(slug))
}

async fn invalidate_slugs(state: &AppState, old: Option<&str>, new: Option<&str>) {
    for slug in [old, new].into_iter().flatten() {
        state.storefronts().invalidate(slug).await;
    }
}

async fn invalidate_own_storefront(state: &AppState, user: &CurrentUser) -> Result<()> {
    let profile = ProfileRepository::new(state.pool()).require(user.id).await?;
    invalidate_slugs(state, profile.slug.as_deref(), None).await;
    Ok(())
}
