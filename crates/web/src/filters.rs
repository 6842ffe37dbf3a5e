//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

use slipbook_core::money;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a decimal amount with thousands separators.
///
/// Non-numeric input renders as `0`.
///
/// Usage in templates: `{{ receipt.totals.total|amount }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn amount(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_display_amount(&value.to_string()))
}

fn format_display_amount(raw: &str) -> String {
    let value = raw.trim().parse::<Decimal>().unwrap_or_default();
    money::format_amount(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display_amount() {
        assert_eq!(format_display_amount("2100.00"), "2,100");
        assert_eq!(format_display_amount("1234.5"), "1,234.5");
        assert_eq!(format_display_amount("abc"), "0");
    }
}
