//! Storefront price list entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use slipbook_core::{MenuItemId, ProfileId};

/// One product or service on a business's public price list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub profile_id: ProfileId,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MenuItem {
    /// Description line shown under the item name.
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("Verified authentic listing.")
    }
}

/// A price list row submitted from the settings page.
///
/// Rows without an id are new; rows with one update an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemDraft {
    pub id: Option<MenuItemId>,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
}
