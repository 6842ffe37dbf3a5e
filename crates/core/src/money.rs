//! Amount parsing and display.
//!
//! Form inputs for prices, quantities, shipping and discounts are free text.
//! Anything that does not parse as a number counts as zero, so a half-filled
//! receipt still produces a total instead of an error.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol used when a profile has none configured.
pub const DEFAULT_CURRENCY: &str = "₦";

/// Decimal places kept on stored money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a stored money column holds (`NUMERIC(14,2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, MONEY_SCALE);

/// Round an amount to the stored money scale, halves away from zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use slipbook_core::money::round_money;
///
/// assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
/// assert_eq!(round_money(Decimal::new(-1235, 3)), Decimal::new(-124, 2));
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user-entered amount, treating non-numeric input as zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use slipbook_core::money::parse_lenient;
///
/// assert_eq!(parse_lenient(" 1500 "), Decimal::from(1500));
/// assert_eq!(parse_lenient("12.50"), Decimal::new(1250, 2));
/// assert_eq!(parse_lenient(""), Decimal::ZERO);
/// assert_eq!(parse_lenient("abc"), Decimal::ZERO);
/// ```
#[must_use]
pub fn parse_lenient(input: &str) -> Decimal {
    Decimal::from_str(input.trim()).unwrap_or(Decimal::ZERO)
}

/// Format an amount with thousands separators and at most two decimals.
///
/// Trailing fractional zeros are dropped, so whole amounts render without a
/// decimal point.
///
/// ```
/// use rust_decimal::Decimal;
/// use slipbook_core::money::format_amount;
///
/// assert_eq!(format_amount(Decimal::from(2100)), "2,100");
/// assert_eq!(format_amount(Decimal::new(123_450, 2)), "1,234.5");
/// assert_eq!(format_amount(Decimal::from(-1_000_000)), "-1,000,000");
/// ```
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = round_money(amount).normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Extract the display symbol from a stored currency label.
///
/// Settings store labels such as `"₦ (NGN)"`; receipts and the storefront
/// only show the leading symbol.
#[must_use]
pub fn currency_symbol(label: &str) -> &str {
    label
        .split_whitespace()
        .next()
        .unwrap_or(DEFAULT_CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_accepts_signed_and_fractional() {
        assert_eq!(parse_lenient("-200"), Decimal::from(-200));
        assert_eq!(parse_lenient("0.5"), Decimal::new(5, 1));
    }

    #[test]
    fn test_parse_lenient_rejects_separators() {
        // A grouped number is not a number, same as the browser's Number()
        assert_eq!(parse_lenient("1,000"), Decimal::ZERO);
        assert_eq!(parse_lenient("₦500"), Decimal::ZERO);
    }

    #[test]
    fn test_format_amount_small_values() {
        assert_eq!(format_amount(Decimal::ZERO), "0");
        assert_eq!(format_amount(Decimal::from(999)), "999");
        assert_eq!(format_amount(Decimal::from(1000)), "1,000");
    }

    #[test]
    fn test_format_amount_rounds_to_two_places() {
        assert_eq!(format_amount(Decimal::new(10_005, 3)), "10.01");
        assert_eq!(format_amount(Decimal::new(250_000, 2)), "2,500");
    }

    #[test]
    fn test_format_amount_negative_zero() {
        assert_eq!(format_amount(Decimal::new(-1, 3)), "0");
    }

    #[test]
    fn test_max_amount_fits_numeric_14_2() {
        assert_eq!(MAX_AMOUNT.to_string(), "999999999999.99");
        assert_eq!(round_money(MAX_AMOUNT), MAX_AMOUNT);
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol("₦ (NGN)"), "₦");
        assert_eq!(currency_symbol("$"), "$");
        assert_eq!(currency_symbol("   "), DEFAULT_CURRENCY);
    }
}
