//! Saved receipts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use slipbook_core::receipt::{LineItem, PaymentMethod, ReceiptStatus, ReceiptTotals};
use slipbook_core::{ProfileId, ReceiptId};

use crate::db::RepositoryError;

/// A receipt as stored, with parsed enums and line items.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub id: ReceiptId,
    pub profile_id: ProfileId,
    pub receipt_number: String,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub totals: ReceiptTotals,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: ReceiptStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Display date, `dd/mm/yyyy`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }
}

/// Row shape of `app.receipt`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReceiptRow {
    pub id: ReceiptId,
    pub profile_id: ProfileId,
    pub receipt_number: String,
    pub customer_name: String,
    pub items: Json<Vec<LineItem>>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = RepositoryError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        let payment_method = row.payment_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("receipt {} payment method: {e}", row.id))
        })?;
        let status = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("receipt {} status: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            profile_id: row.profile_id,
            receipt_number: row.receipt_number,
            customer_name: row.customer_name,
            items: row.items.0,
            totals: ReceiptTotals {
                subtotal: row.subtotal,
                shipping: row.shipping,
                discount: row.discount,
                total: row.total_amount,
            },
            currency: row.currency,
            payment_method,
            status,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Everything needed to insert a receipt.
///
/// Totals are computed by the caller from the items so the stored columns
/// always agree with the stored line items.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub receipt_number: String,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub totals: ReceiptTotals,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: ReceiptStatus,
    pub note: Option<String>,
}
