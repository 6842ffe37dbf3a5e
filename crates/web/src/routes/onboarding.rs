//! First-run business setup.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use slipbook_core::money::DEFAULT_CURRENCY;
use slipbook_core::profile::needs_onboarding;

use crate::db::ProfileRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Currencies offered during setup, as `(value, label)`.
pub const CURRENCY_OPTIONS: [(&str, &str); 2] = [("₦", "₦ Naira (NGN)"), ("$", "$ Dollar (USD)")];

/// Onboarding form data.
#[derive(Debug, Deserialize)]
pub struct OnboardingForm {
    pub business_name: String,
    #[serde(default)]
    pub business_phone: String,
    #[serde(default)]
    pub currency: String,
}

/// Onboarding page template.
#[derive(Template, WebTemplate)]
#[template(path = "onboarding.html")]
pub struct OnboardingTemplate {
    pub error: Option<&'static str>,
    pub business_name: String,
    pub business_phone: String,
    pub currency: String,
    pub currencies: &'static [(&'static str, &'static str)],
}

/// Display the onboarding form, prefilled from the profile.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OnboardingTemplate> {
    let profile = ProfileRepository::new(state.pool()).require(user.id).await?;

    let business_name = if needs_onboarding(&profile.business_name) {
        String::new()
    } else {
        profile.business_name
    };

    Ok(OnboardingTemplate {
        error: None,
        business_name,
        business_phone: profile.business_phone.unwrap_or_default(),
        currency: profile.currency,
        currencies: &CURRENCY_OPTIONS,
    })
}

/// Save onboarding answers and continue to the dashboard.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<OnboardingForm>,
) -> Result<Response> {
    let business_name = form.business_name.trim();
    let business_phone = form.business_phone.trim();
    let currency = selected_currency(&form.currency);

    if business_name.is_empty() {
        return Ok(OnboardingTemplate {
            error: Some("Business name is required."),
            business_name: String::new(),
            business_phone: business_phone.to_owned(),
            currency: currency.to_owned(),
            currencies: &CURRENCY_OPTIONS,
        }
        .into_response());
    }

    let phone = (!business_phone.is_empty()).then_some(business_phone);
    ProfileRepository::new(state.pool())
        .complete_onboarding(user.id, business_name, phone, currency)
        .await?;

    tracing::info!("Onboarding complete");
    Ok(Redirect::to("/dashboard").into_response())
}

/// The submitted currency if it is one we offer, otherwise the default.
fn selected_currency(value: &str) -> &'static str {
    CURRENCY_OPTIONS
        .iter()
        .find(|(code, _)| *code == value.trim())
        .map_or(DEFAULT_CURRENCY, |&(code, _)| code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_currency() {
        assert_eq!(selected_currency("$"), "$");
        assert_eq!(selected_currency(" ₦ "), "₦");
        assert_eq!(selected_currency("€"), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_missing_name_renders_error() {
        let html = OnboardingTemplate {
            error: Some("Business name is required."),
            business_name: String::new(),
            business_phone: String::new(),
            currency: "₦".to_owned(),
            currencies: &CURRENCY_OPTIONS,
        }
        .render()
        .expect("renders");
        assert!(html.contains("Business name is required."));
        assert!(html.contains("Dollar (USD)"));
    }
}
