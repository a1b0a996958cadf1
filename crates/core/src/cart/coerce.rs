//! Lenient `serde` field deserializers for cart rows.
//!
//! Cart rows are written by several clients over time and the numeric fields
//! are not reliably typed. These helpers never fail on a present value:
//! missing or `null` becomes `None`, anything present but non-numeric becomes
//! zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::price::number_to_decimal;

/// Deserialize a quantity. Fractions are truncated, negatives clamp to zero.
pub fn quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| to_amount(&v)).map(|amount| {
        amount
            .trunc()
            .max(Decimal::ZERO)
            .to_u32()
            .unwrap_or(u32::MAX)
    }))
}

/// Deserialize a currency amount in standard units.
pub fn amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| to_amount(&v)))
}

/// Deserialize an identifier that may have been stored as a number.
/// Blank strings are treated as absent.
pub fn id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| text(&v)).map(T::from))
}

/// Deserialize an optional display string, accepting numbers.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| text(&v)))
}

/// Deserialize a boolean flag; anything other than `true` is `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

/// `None` for null, the parsed amount for numbers and numeric strings,
/// zero for everything else.
fn to_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(number_to_decimal(n).unwrap_or(Decimal::ZERO)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(Decimal::ZERO);
            }
            Some(Decimal::from_str(trimmed).unwrap_or(Decimal::ZERO))
        }
        _ => Some(Decimal::ZERO),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
