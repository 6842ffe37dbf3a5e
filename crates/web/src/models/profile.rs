//! Business profile model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use slipbook_core::ProfileId;
use slipbook_core::money;
use slipbook_core::profile as rules;

/// A business owner's branding and receipt defaults.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub business_name: String,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub tagline: Option<String>,
    pub address: Option<String>,
    pub footer_message: Option<String>,
    /// Currency label, e.g. `₦` or `₦ (NGN)`.
    pub currency: String,
    pub logo_url: Option<String>,
    pub theme_color: String,
    pub slug: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Symbol shown next to amounts.
    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        money::currency_symbol(&self.currency)
    }

    /// Letter used in place of a missing logo.
    #[must_use]
    pub fn logo_letter(&self) -> char {
        rules::logo_letter(&self.business_name, 'B')
    }

    /// Whether the dashboard should nag about missing branding.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        rules::is_profile_incomplete(
            &self.business_name,
            self.business_phone.as_deref(),
            self.logo_url.as_deref(),
        )
    }

    /// Tagline for the storefront header.
    #[must_use]
    pub fn tagline_or_default(&self) -> &str {
        self.tagline
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Official Price List")
    }

    /// Closing line printed at the bottom of receipts.
    #[must_use]
    pub fn footer_or_default(&self) -> &str {
        self.footer_message
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Thank you for your patronage")
    }
}
