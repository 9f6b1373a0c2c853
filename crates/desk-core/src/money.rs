//! Decimal money helpers.
//!
//! Amounts are `rust_decimal::Decimal`. They serialize as JSON strings
//! (`"12.50"`), are accepted from clients as numbers or strings, and are
//! stored as TEXT in SQL. Arithmetic on amounts goes through the checked
//! helpers here and reports overflow as a validation error.

use std::str::FromStr;

pub use rust_decimal::Decimal;

use crate::errors::CoreError;

/// Largest amount accepted for a single price, total, expense or salary.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

fn overflow(what: &str) -> CoreError {
    CoreError::Validation(format!("{what} is out of range"))
}

/// `price * quantity` for one line item.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the product does not fit in a `Decimal`.
pub fn line_subtotal(price: Decimal, quantity: i64) -> Result<Decimal, CoreError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| overflow("line subtotal"))
}

/// Profit made on one sold line: `(price - cost_price) * quantity`.
///
/// Negative when an item is sold below cost.
///
/// # Errors
///
/// Returns `CoreError::Validation` on overflow.
pub fn line_profit(
    price: Decimal,
    cost_price: Decimal,
    quantity: i64,
) -> Result<Decimal, CoreError> {
    price
        .checked_sub(cost_price)
        .and_then(|margin| margin.checked_mul(Decimal::from(quantity)))
        .ok_or_else(|| overflow("line profit"))
}

/// `a + b`, naming `what` when the sum overflows.
///
/// # Errors
///
/// Returns `CoreError::Validation` on overflow.
pub fn add_amounts(what: &str, a: Decimal, b: Decimal) -> Result<Decimal, CoreError> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

/// `a - b`, naming `what` when the difference overflows.
///
/// # Errors
///
/// Returns `CoreError::Validation` on overflow.
pub fn sub_amounts(what: &str, a: Decimal, b: Decimal) -> Result<Decimal, CoreError> {
    a.checked_sub(b).ok_or_else(|| overflow(what))
}

/// Reject negative amounts and amounts above [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns `CoreError::Validation` naming `field`.
pub fn ensure_amount(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {MAX_AMOUNT} (got {value})"
        )));
    }
    Ok(())
}

/// Parse a stored TEXT amount.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the string is not a decimal number.
pub fn parse_amount(s: &str) -> Result<Decimal, CoreError> {
    Decimal::from_str(s.trim())
        .map_err(|e| CoreError::Validation(format!("invalid amount '{s}': {e}")))
}

/// Render an amount for humans, e.g. `format_amount("₹", 1250.50) == "₹1250.5"`.
#[must_use]
pub fn format_amount(currency_symbol: &str, value: Decimal) -> String {
    format!("{currency_symbol}{}", value.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("120.00", "80.00", 3, "120.00")]
    #[case("10", "12.5", 2, "-5.0")]
    #[case("99.99", "0", 1, "99.99")]
    fn line_profit_cases(
        #[case] price: &str,
        #[case] cost: &str,
        #[case] qty: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(line_profit(dec(price), dec(cost), qty).unwrap(), dec(expected));
    }

    #[test]
    fn line_subtotal_multiplies() {
        assert_eq!(line_subtotal(dec("19.99"), 3).unwrap(), dec("59.97"));
    }

    #[test]
    fn line_math_overflow_is_an_error() {
        let err = line_subtotal(Decimal::MAX, 2).unwrap_err();
        assert!(err.to_string().contains("line subtotal"));
        assert!(line_profit(Decimal::MAX, Decimal::ZERO, i64::MAX).is_err());
        assert!(line_profit(Decimal::MIN, Decimal::MAX, 1).is_err());
    }

    #[test]
    fn sums_report_overflow() {
        assert_eq!(add_amounts("total", dec("1.5"), dec("2")).unwrap(), dec("3.5"));
        assert!(add_amounts("total", Decimal::MAX, Decimal::ONE).is_err());
        assert!(sub_amounts("net", Decimal::MIN, Decimal::ONE).is_err());
    }

    #[test]
    fn negative_amount_rejected() {
        let err = ensure_amount("price", dec("-0.01")).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn zero_is_allowed() {
        assert!(ensure_amount("price", Decimal::ZERO).is_ok());
        assert!(ensure_amount("price", dec("-0")).is_ok());
    }

    #[test]
    fn amount_above_ceiling_rejected() {
        assert!(ensure_amount("total_amount", Decimal::from(MAX_AMOUNT)).is_ok());
        let err = ensure_amount("total_amount", Decimal::MAX).unwrap_err();
        assert!(err.to_string().contains("total_amount"));
    }

    #[test]
    fn parse_amount_accepts_stored_text() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec("12.50"));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn format_amount_trims_trailing_zeros() {
        assert_eq!(format_amount("₹", dec("1250.50")), "₹1250.5");
        assert_eq!(format_amount("$", dec("40.00")), "$40");
    }

    #[test]
    fn decimal_accepts_json_numbers_and_strings() {
        let from_number: Decimal = serde_json::from_str("12.5").unwrap();
        let from_string: Decimal = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}
