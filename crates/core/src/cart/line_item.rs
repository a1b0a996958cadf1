//! Shared-cart line items and participant references.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce;
use crate::types::{MemberId, resolve_unit_price};

/// Assignee ID marking an item nobody has claimed yet ("extra").
pub const EXTRA_ASSIGNEE_ID: &str = "__extra__";

/// One ordered product instance within a shared cart.
///
/// Numeric fields are coerced leniently on deserialization: a missing or
/// `null` value is `None`, a present but non-numeric value is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Row identifier, when the item has been persisted.
    #[serde(default, deserialize_with = "coerce::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: Option<u32>,
    /// Price after modifiers were applied.
    #[serde(
        default,
        alias = "customized_price",
        deserialize_with = "coerce::amount"
    )]
    pub customized_price: Option<Decimal>,
    /// Base unit price.
    #[serde(default, deserialize_with = "coerce::amount")]
    pub price: Option<Decimal>,
    /// Participants the item is assigned to, in assignment order.
    #[serde(default, alias = "assigned_to", deserialize_with = "assignees")]
    pub assigned_to: Vec<Assignee>,
    /// Participant who put the item in the cart.
    #[serde(
        default,
        alias = "added_by_member_id",
        deserialize_with = "coerce::id"
    )]
    pub added_by_member_id: Option<MemberId>,
}

impl LineItem {
    /// Build a line item from a raw backend row, resolving its unit price
    /// from whatever price representation the row carries.
    ///
    /// A row that is not a JSON object yields an empty item.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let mut item = Self::deserialize(raw).unwrap_or_default();
        item.price = Some(resolve_unit_price(raw));
        item
    }
}

/// A participant reference on a line item.
///
/// Registered members carry an `id`; guests carry only a display `name`
/// and maybe an `email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(default, deserialize_with = "coerce::id")]
    pub id: Option<MemberId>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "coerce::flag", skip_serializing_if = "is_false")]
    pub extra: bool,
}

impl Assignee {
    /// A registered member.
    #[must_use]
    pub fn member(id: impl Into<MemberId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// A guest known only by display name.
    #[must_use]
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The unclaimed "extra" marker.
    #[must_use]
    pub fn extra() -> Self {
        Self {
            id: Some(MemberId::new(EXTRA_ASSIGNEE_ID)),
            name: Some("extra".to_owned()),
            email: None,
            extra: true,
        }
    }

    /// Set the email on this reference.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether this entry is the unclaimed "extra" marker.
    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.extra
            || self
                .id
                .as_ref()
                .is_some_and(|id| id.as_str() == EXTRA_ASSIGNEE_ID)
    }
}

/// The viewing participant's own descriptor, used only when structural
/// identifiers do not match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "full_name")]
    pub full_name: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(email: Option<String>, full_name: Option<String>) -> Self {
        Self { email, full_name }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// `assignedTo` may be missing, `null`, or contain junk entries; keep what
/// parses as an object and drop the rest.
fn assignees<'de, D>(deserializer: D) -> Result<Vec<Assignee>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(entries)) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| Assignee::deserialize(entry).ok())
        .collect())
}
