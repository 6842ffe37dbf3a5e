//! Receipt model and arithmetic.
//!
//! A receipt is a list of line items plus shipping and discount. The only
//! rule is `total = Σ(qty × price) + shipping − discount`, computed on
//! amounts rounded to two decimal places.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{MAX_AMOUNT, round_money};

/// Customer name stored when the generator form leaves it blank.
pub const DEFAULT_CUSTOMER_NAME: &str = "Guest Customer";

/// A single line on a receipt.
///
/// Stored as JSON inside the receipt row, so field names are part of the
/// persisted format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Client-side row identifier, kept for stable ordering.
    pub id: String,
    pub name: String,
    pub qty: Decimal,
    pub price: Decimal,
}

impl LineItem {
    /// `qty × price` rounded to the money scale.
    ///
    /// Returns `None` when the product overflows or exceeds [`MAX_AMOUNT`].
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.qty
            .checked_mul(self.price)
            .map(round_money)
            .filter(|total| total.abs() <= MAX_AMOUNT)
    }

    /// `qty × price` for display, saturating instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        round_money(self.qty.saturating_mul(self.price))
    }
}

/// A receipt amount exceeds what a stored receipt can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Amounts must be between -999,999,999,999.99 and 999,999,999,999.99")]
pub struct AmountOutOfRange;

/// Computed money fields of a receipt.
///
/// Every field is already rounded to two decimal places, so the identity
/// `total == subtotal + shipping - discount` survives storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceiptTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl ReceiptTotals {
    /// Compute subtotal and total for a set of line items.
    ///
    /// Line totals, shipping and discount are rounded to two decimal places
    /// before they are summed.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use slipbook_core::receipt::{LineItem, ReceiptTotals};
    ///
    /// let items = vec![
    ///     LineItem { id: "1".into(), name: "Jollof".into(), qty: 2.into(), price: 500.into() },
    ///     LineItem { id: "2".into(), name: "Chapman".into(), qty: 1.into(), price: 1000.into() },
    /// ];
    /// let totals = ReceiptTotals::compute(&items, Decimal::from(200), Decimal::from(100))
    ///     .expect("amounts in range");
    /// assert_eq!(totals.subtotal, Decimal::from(2000));
    /// assert_eq!(totals.total, Decimal::from(2100));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AmountOutOfRange`] if any line, the shipping, the discount
    /// or a computed total falls outside [`MAX_AMOUNT`].
    pub fn compute(
        items: &[LineItem],
        shipping: Decimal,
        discount: Decimal,
    ) -> Result<Self, AmountOutOfRange> {
        let shipping = in_range(round_money(shipping))?;
        let discount = in_range(round_money(discount))?;

        let subtotal = items.iter().try_fold(Decimal::ZERO, |sum, item| {
            let line = item.checked_line_total().ok_or(AmountOutOfRange)?;
            sum.checked_add(line).ok_or(AmountOutOfRange)
        })?;
        let subtotal = in_range(subtotal)?;

        let total = subtotal
            .checked_add(shipping)
            .and_then(|amount| amount.checked_sub(discount))
            .ok_or(AmountOutOfRange)?;

        Ok(Self {
            subtotal,
            shipping,
            discount,
            total: in_range(total)?,
        })
    }
}

fn in_range(amount: Decimal) -> Result<Decimal, AmountOutOfRange> {
    if amount.abs() <= MAX_AMOUNT {
        Ok(amount)
    } else {
        Err(AmountOutOfRange)
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Transfer,
    Cash,
    #[serde(rename = "POS")]
    Pos,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Transfer, Self::Cash, Self::Pos];

    /// Stored and displayed form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Cash => "Cash",
            Self::Pos => "POS",
        }
    }

    /// Parse a form value, falling back to the default for anything unknown.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transfer" => Ok(Self::Transfer),
            "cash" => Ok(Self::Cash),
            "pos" => Ok(Self::Pos),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Settlement state of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReceiptStatus {
    #[default]
    Paid,
    Pending,
}

impl ReceiptStatus {
    pub const ALL: [Self; 2] = [Self::Paid, Self::Pending];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
        }
    }

    #[must_use]
    pub fn from_form(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Layout of the rendered receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptTemplate {
    /// Name and line total only.
    Simple,
    /// Adds the `qty x price` breakdown under each line.
    #[default]
    Detailed,
}

impl ReceiptTemplate {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }

    #[must_use]
    pub const fn is_detailed(self) -> bool {
        matches!(self, Self::Detailed)
    }

    /// Parse a query or form value; anything but `simple` is detailed.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("simple") {
            Self::Simple
        } else {
            Self::Detailed
        }
    }
}

/// Error for enum values that don't match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Format the receipt number following `highest`.
///
/// Numbers are zero-padded to three digits; the first receipt is `001`.
#[must_use]
pub fn next_receipt_number(highest: Option<u32>) -> String {
    let next = highest.map_or(1, |n| n.saturating_add(1));
    format!("{next:03}")
}

/// Whether a receipt matches the history search box.
///
/// Customer names match case-insensitively; receipt numbers match as typed.
/// An empty term matches everything.
#[must_use]
pub fn matches_search(customer_name: &str, receipt_number: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    customer_name
        .to_lowercase()
        .contains(&term.to_lowercase())
        || receipt_number.contains(term)
}

/// The stored customer name for a form value.
#[must_use]
pub fn customer_or_default(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_CUSTOMER_NAME
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::parse_lenient;

    fn item(qty: &str, price: &str) -> LineItem {
        LineItem {
            id: "row".to_owned(),
            name: "Item".to_owned(),
            qty: parse_lenient(qty),
            price: parse_lenient(price),
        }
    }

    fn totals(items: &[LineItem], shipping: &str, discount: &str) -> ReceiptTotals {
        ReceiptTotals::compute(items, parse_lenient(shipping), parse_lenient(discount))
            .expect("amounts in range")
    }

    #[test]
    fn test_totals_reference_example() {
        let totals = totals(&[item("2", "500"), item("1", "1000")], "200", "100");
        assert_eq!(totals.subtotal, Decimal::from(2000));
        assert_eq!(totals.total, Decimal::from(2100));
    }

    #[test]
    fn test_totals_identity_holds_for_varied_inputs() {
        let cases = [
            (vec![], "", ""),
            (vec![item("3", "abc"), item("", "700")], "50", "x"),
            (vec![item("1.5", "99.99"), item("4", "0.25")], "0", "10"),
            (vec![item("10", "1000")], "-5", "20000"),
        ];
        for (items, shipping, discount) in cases {
            let totals = totals(&items, shipping, discount);
            let subtotal: Decimal = items.iter().map(LineItem::line_total).sum();
            assert_eq!(totals.subtotal, subtotal);
            assert_eq!(
                totals.total,
                totals.subtotal + totals.shipping - totals.discount
            );
        }
    }

    #[test]
    fn test_totals_identity_survives_two_place_storage() {
        let totals = totals(&[item("1", "0.005")], "0.005", "0");

        for amount in [totals.subtotal, totals.shipping, totals.discount, totals.total] {
            assert_eq!(round_money(amount), amount);
        }
        assert_eq!(totals.subtotal, Decimal::new(1, 2));
        assert_eq!(totals.shipping, Decimal::new(1, 2));
        assert_eq!(totals.total, Decimal::new(2, 2));
    }

    #[test]
    fn test_line_totals_add_up_to_displayed_subtotal() {
        let items = [item("1.5", "99.99"), item("3", "0.333")];
        let totals = totals(&items, "", "");
        assert_eq!(items[0].line_total(), Decimal::new(14_999, 2));
        assert_eq!(items[1].line_total(), Decimal::new(100, 2));
        assert_eq!(totals.subtotal, Decimal::new(15_099, 2));
    }

    #[test]
    fn test_overflowing_quantity_is_rejected() {
        let items = [item("79228162514264337593543950335", "2")];
        assert_eq!(
            ReceiptTotals::compute(&items, Decimal::ZERO, Decimal::ZERO),
            Err(AmountOutOfRange)
        );
        assert_eq!(items[0].checked_line_total(), None);
        assert_eq!(items[0].line_total(), Decimal::MAX);
    }

    #[test]
    fn test_amounts_beyond_storage_range_are_rejected() {
        let big = [item("1", "999999999999.99")];
        assert!(ReceiptTotals::compute(&big, Decimal::ZERO, Decimal::ZERO).is_ok());
        assert_eq!(
            ReceiptTotals::compute(&big, Decimal::ONE, Decimal::ZERO),
            Err(AmountOutOfRange)
        );
        assert_eq!(
            ReceiptTotals::compute(&[], parse_lenient("1000000000000"), Decimal::ZERO),
            Err(AmountOutOfRange)
        );
        assert_eq!(
            ReceiptTotals::compute(&[item("1000000", "1000000")], Decimal::ZERO, Decimal::ZERO),
            Err(AmountOutOfRange)
        );
    }

    #[test]
    fn test_non_numeric_fields_count_as_zero() {
        let totals = totals(&[item("two", "500")], "", "0");
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(PaymentMethod::from_form("POS"), PaymentMethod::Pos);
        assert_eq!(PaymentMethod::from_form("cash"), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from_form("cheque"), PaymentMethod::Transfer);
    }

    #[test]
    fn test_payment_method_serde_matches_display() {
        let json = serde_json::to_string(&PaymentMethod::Pos).unwrap_or_default();
        assert_eq!(json, "\"POS\"");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(ReceiptStatus::from_form("Pending"), ReceiptStatus::Pending);
        assert_eq!(ReceiptStatus::from_form(""), ReceiptStatus::Paid);
    }

    #[test]
    fn test_next_receipt_number() {
        assert_eq!(next_receipt_number(None), "001");
        assert_eq!(next_receipt_number(Some(1)), "002");
        assert_eq!(next_receipt_number(Some(999)), "1000");
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Mama Nkechi", "014", ""));
        assert!(matches_search("Mama Nkechi", "014", "nkechi"));
        assert!(matches_search("Mama Nkechi", "014", "14"));
        assert!(!matches_search("Mama Nkechi", "014", "tunde"));
    }

    #[test]
    fn test_customer_or_default() {
        assert_eq!(customer_or_default("  "), DEFAULT_CUSTOMER_NAME);
        assert_eq!(customer_or_default(" Bola "), "Bola");
    }

    #[test]
    fn test_template_from_form() {
        assert_eq!(ReceiptTemplate::from_form("Simple"), ReceiptTemplate::Simple);
        assert_eq!(ReceiptTemplate::from_form("detailed"), ReceiptTemplate::Detailed);
        assert_eq!(ReceiptTemplate::from_form(""), ReceiptTemplate::Detailed);
    }
}
