//! Receipt generator and the branded receipt page.
//!
//! Line items arrive as repeated `item_name` / `item_qty` / `item_price`
//! fields, so the form is read as raw pairs and zipped back into rows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use slipbook_core::ReceiptId;
use slipbook_core::money::{format_amount, parse_lenient};
use slipbook_core::profile::{is_hex_color, logo_letter};
use slipbook_core::receipt::{
    LineItem, PaymentMethod, ReceiptStatus, ReceiptTemplate, ReceiptTotals, customer_or_default,
    next_receipt_number,
};

use super::NavView;
use crate::db::{ProfileRepository, ReceiptRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewReceipt, Profile, Receipt};
use crate::state::AppState;

/// Customer name shown in the preview while the field is blank.
const PREVIEW_CUSTOMER_NAME: &str = "Walk-in Customer";

/// Letter shown on receipts when the business has no logo.
const RECEIPT_LOGO_FALLBACK: char = 'R';

/// Parsed generator form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorForm {
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub shipping: String,
    pub discount: String,
    pub payment_method: PaymentMethod,
    pub status: ReceiptStatus,
    pub note: String,
}

impl GeneratorForm {
    /// Rebuild the form from raw `(name, value)` pairs.
    ///
    /// Item fields are matched by position. Rows with neither a name nor a
    /// price are dropped.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        let mut names = Vec::new();
        let mut quantities = Vec::new();
        let mut prices = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "customer_name" => form.customer_name = value,
                "item_name" => names.push(value),
                "item_qty" => quantities.push(value),
                "item_price" => prices.push(value),
                "shipping" => form.shipping = value,
                "discount" => form.discount = value,
                "payment_method" => form.payment_method = PaymentMethod::from_form(&value),
                "status" => form.status = ReceiptStatus::from_form(&value),
                "note" => form.note = value,
                _ => {}
            }
        }

        form.items = names
            .into_iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let qty = quantities.get(index).map_or("1", String::as_str);
                let price = prices.get(index).map_or("", String::as_str);
                if name.trim().is_empty() && price.trim().is_empty() {
                    return None;
                }
                Some(LineItem {
                    id: (index + 1).to_string(),
                    name: name.trim().to_owned(),
                    qty: parse_lenient(qty),
                    price: parse_lenient(price),
                })
            })
            .collect();
        form
    }

    /// Totals for the submitted items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when an amount is too large to store.
    pub fn totals(&self) -> Result<ReceiptTotals> {
        ReceiptTotals::compute(
            &self.items,
            parse_lenient(&self.shipping),
            parse_lenient(&self.discount),
        )
        .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Generator page, optionally with a live preview.
#[derive(Template, WebTemplate)]
#[template(path = "generate.html")]
pub struct GeneratorTemplate {
    pub nav: NavView,
    pub profile: Profile,
    pub receipt_number: String,
    pub date: String,
    pub form: GeneratorForm,
    pub totals: ReceiptTotals,
    pub preview_customer: String,
    pub logo_letter: char,
    pub payment_methods: [PaymentMethod; 3],
    pub statuses: [ReceiptStatus; 2],
}

impl GeneratorTemplate {
    fn new(
        user: &CurrentUser,
        profile: Profile,
        receipt_number: String,
        form: GeneratorForm,
    ) -> Result<Self> {
        let totals = form.totals()?;
        let preview_customer = if form.customer_name.trim().is_empty() {
            PREVIEW_CUSTOMER_NAME.to_owned()
        } else {
            form.customer_name.trim().to_owned()
        };
        let logo_letter = logo_letter(&profile.business_name, RECEIPT_LOGO_FALLBACK);

        Ok(Self {
            nav: NavView::new("generate", user),
            profile,
            receipt_number,
            date: Utc::now().format("%d/%m/%Y").to_string(),
            form,
            totals,
            preview_customer,
            logo_letter,
            payment_methods: PaymentMethod::ALL,
            statuses: ReceiptStatus::ALL,
        })
    }
}

/// Display the generator with one blank line item.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn new(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<GeneratorTemplate> {
    let (profile, receipt_number) = load_branding(&state, &user).await?;
    let form = GeneratorForm {
        items: vec![LineItem {
            id: "1".to_owned(),
            name: String::new(),
            qty: 1.into(),
            price: 0.into(),
        }],
        ..GeneratorForm::default()
    };
    GeneratorTemplate::new(&user, profile, receipt_number, form)
}

/// Re-render the generator with the submitted values in the preview.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn preview(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<GeneratorTemplate> {
    let (profile, receipt_number) = load_branding(&state, &user).await?;
    let form = GeneratorForm::from_pairs(pairs);
    GeneratorTemplate::new(&user, profile, receipt_number, form)
}

/// Save the receipt and open its branded page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = GeneratorForm::from_pairs(pairs);
    if form.items.is_empty() {
        return Err(AppError::BadRequest("Add at least one item".to_string()));
    }
    let totals = form.totals()?;

    let (profile, receipt_number) = load_branding(&state, &user).await?;
    let note = form.note.trim();
    let receipt = NewReceipt {
        receipt_number,
        customer_name: customer_or_default(&form.customer_name).to_owned(),
        totals,
        items: form.items,
        currency: profile.currency_symbol().to_owned(),
        payment_method: form.payment_method,
        status: form.status,
        note: (!note.is_empty()).then(|| note.to_owned()),
    };

    let saved = ReceiptRepository::new(state.pool())
        .create(user.id, &receipt)
        .await?;

    add_breadcrumb(
        "receipt",
        "Saved receipt",
        Some(&[("receipt_number", saved.receipt_number.as_str())]),
    );
    tracing::info!(receipt_id = %saved.id, "Receipt saved");
    Ok(Redirect::to(&format!("/receipts/{}", saved.id)).into_response())
}

async fn load_branding(
    state: &AppState,
    user: &CurrentUser,
) -> Result<(Profile, String)> {
    let profiles = ProfileRepository::new(state.pool());
    let receipts = ReceiptRepository::new(state.pool());
    let (profile, highest) =
        tokio::try_join!(profiles.require(user.id), receipts.highest_number(user.id))?;
    Ok((profile, next_receipt_number(highest)))
}

/// Display options for the receipt page.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptQuery {
    pub template: Option<String>,
    pub show_logo: Option<String>,
    pub color: Option<String>,
}

impl ReceiptQuery {
    fn template(&self) -> ReceiptTemplate {
        self.template
            .as_deref()
            .map(ReceiptTemplate::from_form)
            .unwrap_or_default()
    }

    fn show_logo(&self) -> bool {
        !matches!(self.show_logo.as_deref(), Some("0" | "false" | "off"))
    }

    /// Theme override, accepted only as a `#rrggbb` hex color.
    fn color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| is_hex_color(c))
    }
}

/// Branded receipt page.
#[derive(Template, WebTemplate)]
#[template(path = "receipt.html")]
pub struct ReceiptPageTemplate {
    pub nav: NavView,
    pub profile: Profile,
    pub receipt: Receipt,
    pub layout: ReceiptTemplate,
    pub show_logo: bool,
    pub theme_color: String,
    pub logo_letter: char,
    pub share_url: String,
}

/// Display a saved receipt.
#[instrument(skip_all, fields(user_id = %user.id, receipt_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ReceiptId>,
    Query(query): Query<ReceiptQuery>,
) -> Result<ReceiptPageTemplate> {
    let profiles = ProfileRepository::new(state.pool());
    let receipts = ReceiptRepository::new(state.pool());
    let (profile, receipt) = tokio::try_join!(profiles.require(user.id), receipts.get(user.id, id))?;
    let receipt = receipt.ok_or_else(|| AppError::NotFound(format!("receipt {id}")))?;

    let theme_color = query
        .color()
        .map_or_else(|| profile.theme_color.clone(), str::to_owned);
    let share_url = whatsapp_share_url(&profile, &receipt);

    Ok(ReceiptPageTemplate {
        nav: NavView::new("history", &user),
        logo_letter: logo_letter(&profile.business_name, RECEIPT_LOGO_FALLBACK),
        layout: query.template(),
        show_logo: query.show_logo(),
        theme_color,
        share_url,
        profile,
        receipt,
    })
}

/// `wa.me` link with a plain-text summary of the receipt.
fn whatsapp_share_url(profile: &Profile, receipt: &Receipt) -> String {
    let text = format!(
        "Receipt {} from {}\nTotal: {}{}\nThank you!",
        receipt.receipt_number,
        profile.business_name,
        receipt.currency,
        format_amount(receipt.totals.total),
    );
    format!("https://wa.me/?text={}", urlencoding::encode(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_form_zips_repeated_item_fields() {
        let form = GeneratorForm::from_pairs(pairs(&[
            ("customer_name", "Bola"),
            ("item_name", "Jollof"),
            ("item_qty", "2"),
            ("item_price", "500"),
            ("item_name", "Chapman"),
            ("item_qty", "1"),
            ("item_price", "1000"),
            ("shipping", "200"),
            ("discount", "100"),
            ("payment_method", "POS"),
        ]));

        assert_eq!(form.items.len(), 2);
        assert_eq!(form.payment_method, PaymentMethod::Pos);
        let totals = form.totals().expect("amounts in range");
        assert_eq!(totals.subtotal, Decimal::from(2000));
        assert_eq!(totals.total, Decimal::from(2100));
    }

    #[test]
    fn test_form_drops_blank_rows() {
        let form = GeneratorForm::from_pairs(pairs(&[
            ("item_name", ""),
            ("item_qty", "3"),
            ("item_price", ""),
            ("item_name", ""),
            ("item_qty", "1"),
            ("item_price", "250"),
        ]));
        assert_eq!(form.items.len(), 1);
        assert_eq!(form.items[0].price, Decimal::from(250));
    }

    #[test]
    fn test_form_treats_garbage_as_zero() {
        let form = GeneratorForm::from_pairs(pairs(&[
            ("item_name", "Suya"),
            ("item_qty", "two"),
            ("item_price", "700"),
            ("shipping", "free"),
        ]));
        assert_eq!(form.totals().expect("amounts in range").total, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_amounts_are_a_bad_request() {
        let form = GeneratorForm::from_pairs(pairs(&[
            ("item_name", "Generator"),
            ("item_qty", "79228162514264337593543950335"),
            ("item_price", "2"),
        ]));
        let err = form.totals().expect_err("out of range");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let form = GeneratorForm::from_pairs(pairs(&[
            ("item_name", "Deposit"),
            ("item_price", "1000000000000"),
        ]));
        assert!(matches!(form.totals(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_receipt_query_options() {
        let query = ReceiptQuery {
            template: Some("simple".to_owned()),
            show_logo: Some("0".to_owned()),
            color: Some("javascript:alert(1)".to_owned()),
        };
        assert_eq!(query.template(), ReceiptTemplate::Simple);
        assert!(!query.show_logo());
        assert_eq!(query.color(), None);

        let defaults = ReceiptQuery::default();
        assert_eq!(defaults.template(), ReceiptTemplate::Detailed);
        assert!(defaults.show_logo());
    }
}
