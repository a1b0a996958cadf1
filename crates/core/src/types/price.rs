//! Unit price resolution.
//!
//! Menu rows and cart rows reach us with competing price representations:
//! an already-customized numeric price, a plain price that may be a currency
//! string (`"$12.50"`), a nested `pricing` object, or an integer amount in
//! cents under one of several names. [`resolve_unit_price`] collapses them
//! into one [`Decimal`] amount in the currency's standard unit.
//!
//! Every function here is total: malformed input resolves to zero rather than
//! an error, and a `Decimal` can never be NaN or infinite.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;

/// Keys holding an already-customized price (numeric only).
const CUSTOMIZED_KEYS: &[&[&str]] = &[&["customizedPrice"], &["customized_price"]];

/// Keys holding a price in standard units, in priority order.
const PRICE_KEYS: &[&[&str]] = &[
    &["unitPrice"],
    &["unit_price"],
    &["price"],
    &["pricing", "price"],
];

/// Keys holding a price in cents, in priority order.
const CENTS_KEYS: &[&[&str]] = &[
    &["price_cents"],
    &["priceCents"],
    &["unit_price_cents"],
    &["pricing", "price_cents"],
    &["pricing", "cents"],
    &["menu_item", "price_cents"],
];

/// Resolve the unit price of a line-item-like JSON object.
///
/// Resolution order:
/// 1. `customizedPrice` / `customized_price` when it is a JSON number
/// 2. `unitPrice`, `unit_price`, `price`, `pricing.price` parsed from a number
///    or a currency string
/// 3. a cents field (`price_cents`, `priceCents`, ...) divided by 100
/// 4. zero
///
/// ```
/// use group_order_core::resolve_unit_price;
/// use rust_decimal::Decimal;
///
/// let item = serde_json::json!({ "price_cents": 1250 });
/// assert_eq!(resolve_unit_price(&item), Decimal::new(125, 1));
/// ```
#[must_use]
pub fn resolve_unit_price(item: &Value) -> Decimal {
    let customized = CUSTOMIZED_KEYS
        .iter()
        .filter_map(|path| lookup(item, path))
        .find_map(|v| match v {
            Value::Number(n) => number_to_decimal(n),
            _ => None,
        });

    customized
        .or_else(|| {
            PRICE_KEYS
                .iter()
                .filter_map(|path| lookup(item, path))
                .find_map(parse_amount)
        })
        .or_else(|| {
            CENTS_KEYS
                .iter()
                .filter_map(|path| lookup(item, path))
                .find_map(parse_amount)
                .map(|cents| cents / Decimal::ONE_HUNDRED)
        })
        .unwrap_or(Decimal::ZERO)
        .normalize()
}

/// Parse an amount from a JSON number or a currency-formatted string.
///
/// Strings are stripped of every character except ASCII digits, `.` and `-`,
/// then the longest leading number is taken. `"$1,234.50"` parses as
/// `1234.50`, `"12.50 USD."` as `12.50` and `"$10-$12"` as `10`. Returns
/// `None` for anything else, or when no number leads the stripped text.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => {
            let stripped: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
                .collect();
            Decimal::from_str(leading_number(&stripped)?).ok()
        }
        _ => None,
    }
}

/// The longest prefix of the form `-?digits(.digits)?` (or `-?.digits`).
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
            has_digits = true;
        }
    }

    has_digits.then(|| &s[..end])
}

/// Format an amount for display, e.g. `$12.50`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

pub(crate) fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    n.as_i64()
        .map(Decimal::from)
        .or_else(|| n.as_u64().map(Decimal::from))
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |v, key| v.get(*key))
        .filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cents_are_divided() {
        assert_eq!(
            resolve_unit_price(&json!({ "price_cents": 1250 })),
            Decimal::new(125, 1)
        );
        assert_eq!(
            resolve_unit_price(&json!({ "pricing": { "cents": "899" } })),
            Decimal::new(899, 2)
        );
        assert_eq!(
            resolve_unit_price(&json!({ "menu_item": { "price_cents": 300 } })),
            Decimal::new(3, 0)
        );
    }

    #[test]
    fn test_customized_price_wins() {
        let item = json!({ "customizedPrice": 7.25, "price": "$5.00", "price_cents": 100 });
        assert_eq!(resolve_unit_price(&item), Decimal::new(725, 2));
    }

    #[test]
    fn test_customized_price_must_be_numeric() {
        let item = json!({ "customizedPrice": "7.25", "price": 5 });
        assert_eq!(resolve_unit_price(&item), Decimal::new(5, 0));
    }

    #[test]
    fn test_currency_strings_are_stripped() {
        assert_eq!(
            resolve_unit_price(&json!({ "price": "$1,234.50" })),
            Decimal::new(123_450, 2)
        );
        assert_eq!(
            resolve_unit_price(&json!({ "unit_price": "USD 9.99" })),
            Decimal::new(999, 2)
        );
    }

    #[test]
    fn test_trailing_text_after_amount_is_ignored() {
        assert_eq!(parse_amount(&json!("$12.50.")), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_amount(&json!("12.50 USD.")), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_amount(&json!("$10-$12")), Some(Decimal::new(10, 0)));
        assert_eq!(parse_amount(&json!("1.2.3")), Some(Decimal::new(12, 1)));
        assert_eq!(parse_amount(&json!("-4.5")), Some(Decimal::new(-45, 1)));
    }

    #[test]
    fn test_amount_strings_without_a_leading_number() {
        assert_eq!(parse_amount(&json!("abc")), None);
        assert_eq!(parse_amount(&json!("")), None);
        assert_eq!(parse_amount(&json!("-")), None);
        assert_eq!(parse_amount(&json!("--5")), None);
        assert_eq!(parse_amount(&json!(".")), None);
    }

    #[test]
    fn test_nested_pricing_price() {
        let item = json!({ "pricing": { "price": 11 } });
        assert_eq!(resolve_unit_price(&item), Decimal::new(11, 0));
    }

    #[test]
    fn test_unparseable_price_falls_through_to_cents() {
        let item = json!({ "price": "market price", "priceCents": 450 });
        assert_eq!(resolve_unit_price(&item), Decimal::new(45, 1));
    }

    #[test]
    fn test_defaults_to_zero() {
        assert_eq!(resolve_unit_price(&json!({})), Decimal::ZERO);
        assert_eq!(resolve_unit_price(&json!(null)), Decimal::ZERO);
        assert_eq!(resolve_unit_price(&json!({ "price": null })), Decimal::ZERO);
        assert_eq!(resolve_unit_price(&json!({ "price": [1, 2] })), Decimal::ZERO);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(125, 1)), "$12.50");
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
        assert_eq!(format_price(Decimal::new(19_999, 3)), "$20.00");
    }
}
