//! Receipt history with search and delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use slipbook_core::ReceiptId;
use slipbook_core::receipt::matches_search;

use super::NavView;
use crate::db::ReceiptRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Receipt;
use crate::state::AppState;

/// History search query.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub q: String,
}

/// History page template.
#[derive(Template, WebTemplate)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub nav: NavView,
    pub query: String,
    pub receipts: Vec<Receipt>,
}

/// List receipts, newest first, filtered by customer name or number.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<HistoryTemplate> {
    let receipts = ReceiptRepository::new(state.pool())
        .list(user.id, None)
        .await?;

    Ok(HistoryTemplate {
        nav: NavView::new("history", &user),
        receipts: filter_receipts(receipts, &query.q),
        query: query.q.trim().to_owned(),
    })
}

/// Delete one of the owner's receipts.
#[instrument(skip_all, fields(user_id = %user.id, receipt_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ReceiptId>,
) -> Result<Redirect> {
    ReceiptRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    tracing::info!("Receipt deleted");
    Ok(Redirect::to("/history"))
}

fn filter_receipts(receipts: Vec<Receipt>, term: &str) -> Vec<Receipt> {
    receipts
        .into_iter()
        .filter(|r| matches_search(&r.customer_name, &r.receipt_number, term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use slipbook_core::ProfileId;
    use slipbook_core::receipt::{PaymentMethod, ReceiptStatus, ReceiptTotals};

    fn receipt(number: &str, customer: &str) -> Receipt {
        Receipt {
            id: ReceiptId::random(),
            profile_id: ProfileId::random(),
            receipt_number: number.to_owned(),
            customer_name: customer.to_owned(),
            items: vec![],
            totals: ReceiptTotals::default(),
            currency: "₦".to_owned(),
            payment_method: PaymentMethod::Cash,
            status: ReceiptStatus::Paid,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_keeps_order() {
        let receipts = vec![
            receipt("003", "Tunde"),
            receipt("002", "Mama Nkechi"),
            receipt("001", "Nkechi Stores"),
        ];
        let numbers: Vec<String> = filter_receipts(receipts, "NKECHI")
            .into_iter()
            .map(|r| r.receipt_number)
            .collect();
        assert_eq!(numbers, vec!["002", "001"]);
    }

    #[test]
    fn test_empty_term_keeps_everything() {
        let receipts = vec![receipt("002", "A"), receipt("001", "B")];
        assert_eq!(filter_receipts(receipts, "  ").len(), 2);
    }
}
