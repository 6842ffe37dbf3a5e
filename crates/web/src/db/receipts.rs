//! Receipt repository.
//!
//! Every query is scoped to the owning profile; a receipt ID alone never
//! reaches another owner's row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use slipbook_core::{ProfileId, ReceiptId};

use super::RepositoryError;
use crate::models::receipt::ReceiptRow;
use crate::models::{NewReceipt, Receipt};

const RECEIPT_COLUMNS: &str = "id, profile_id, receipt_number, customer_name, items, subtotal, \
     shipping, discount, total_amount, currency, payment_method, status, note, created_at";

/// The slice of a receipt the dashboard aggregates over.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleRow {
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Repository for receipt database operations.
pub struct ReceiptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReceiptRepository<'a> {
    /// Create a new receipt repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a receipt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        profile_id: ProfileId,
        receipt: &NewReceipt,
    ) -> Result<Receipt, RepositoryError> {
        let row: ReceiptRow = sqlx::query_as(&format!(
            r"
            INSERT INTO app.receipt
                (profile_id, receipt_number, customer_name, items, subtotal, shipping,
                 discount, total_amount, currency, payment_method, status, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {RECEIPT_COLUMNS}
            "
        ))
        .bind(profile_id)
        .bind(&receipt.receipt_number)
        .bind(&receipt.customer_name)
        .bind(Json(&receipt.items))
        .bind(receipt.totals.subtotal)
        .bind(receipt.totals.shipping)
        .bind(receipt.totals.discount)
        .bind(receipt.totals.total)
        .bind(&receipt.currency)
        .bind(receipt.payment_method.as_str())
        .bind(receipt.status.as_str())
        .bind(&receipt.note)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get one of the owner's receipts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        profile_id: ProfileId,
        id: ReceiptId,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let row: Option<ReceiptRow> = sqlx::query_as(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM app.receipt WHERE id = $1 AND profile_id = $2"
        ))
        .bind(id)
        .bind(profile_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Receipt::try_from).transpose()
    }

    /// List the owner's receipts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        profile_id: ProfileId,
        limit: Option<i64>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let rows: Vec<ReceiptRow> = sqlx::query_as(&format!(
            r"
            SELECT {RECEIPT_COLUMNS}
            FROM app.receipt
            WHERE profile_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "
        ))
        .bind(profile_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Receipt::try_from).collect()
    }

    /// Customer, total and timestamp of every receipt the owner issued.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales(&self, profile_id: ProfileId) -> Result<Vec<SaleRow>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT customer_name, total_amount, created_at
            FROM app.receipt
            WHERE profile_id = $1
            ORDER BY created_at
            ",
        )
        .bind(profile_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Highest numeric receipt number the owner has issued.
    ///
    /// Non-numeric receipt numbers are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn highest_number(&self, profile_id: ProfileId) -> Result<Option<u32>, RepositoryError> {
        let highest: Option<i64> = sqlx::query_scalar(
            r"
            SELECT MAX(receipt_number::bigint)
            FROM app.receipt
            WHERE profile_id = $1 AND receipt_number ~ '^[0-9]{1,9}$'
            ",
        )
        .bind(profile_id)
        .fetch_one(self.pool)
        .await?;

        Ok(highest.and_then(|n| u32::try_from(n).ok()))
    }

    /// Delete one of the owner's receipts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no such receipt.
    pub async fn delete(&self, profile_id: ProfileId, id: ReceiptId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM app.receipt WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
