//! Cart badge aggregation and partial badge updates.
//!
//! A [`Badge`] is the small summary shown next to a cart: item count, running
//! total, a label and the cart it belongs to. Badges are derived on demand and
//! never persisted. Producers broadcast [`BadgeUpdate`]s; consumers merge them
//! into the snapshot they display with [`Badge::apply`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;
use crate::types::CartId;

/// Label used when a cart has no name.
pub const DEFAULT_BADGE_NAME: &str = "Group Order";

/// Display summary of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Sum of item quantities.
    pub count: u32,
    /// Sum of unit price times quantity.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Cart or display label.
    pub name: String,
    pub cart_id: Option<CartId>,
}

impl Default for Badge {
    fn default() -> Self {
        Self {
            count: 0,
            total: Decimal::ZERO,
            name: DEFAULT_BADGE_NAME.to_owned(),
            cart_id: None,
        }
    }
}

impl Badge {
    /// Merge the fields present in `update` into this snapshot.
    pub fn apply(&mut self, update: &BadgeUpdate) {
        if let Some(count) = update.count {
            self.count = count;
        }
        if let Some(total) = update.total {
            self.total = total;
        }
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(cart_id) = &update.cart_id {
            self.cart_id = Some(cart_id.clone());
        }
    }

    /// Owned variant of [`Badge::apply`].
    #[must_use]
    pub fn merged(mut self, update: &BadgeUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// A partial badge update, as carried on the badge broadcast.
///
/// Only these four fields can travel on the broadcast. Anything else in an
/// incoming payload (`restaurant`, `items`, `fulfillment`, ...) is dropped
/// when the payload is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "cart_id", skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
}

impl BadgeUpdate {
    /// Whether the update names a cart other than `cart_id`.
    ///
    /// Updates without a cart are not scoped and concern every listener.
    #[must_use]
    pub fn is_for_other_cart(&self, cart_id: &CartId) -> bool {
        self.cart_id.as_ref().is_some_and(|id| id != cart_id)
    }
}

impl From<Badge> for BadgeUpdate {
    fn from(badge: Badge) -> Self {
        Self {
            count: Some(badge.count),
            total: Some(badge.total),
            name: Some(badge.name),
            cart_id: badge.cart_id,
        }
    }
}

/// Aggregate line items into a badge.
///
/// `count` sums quantities (missing counts as 0). `total` sums
/// `(customized_price ?? price ?? 0) * (quantity ?? 1)`. A missing or blank
/// `name` falls back to [`DEFAULT_BADGE_NAME`].
#[must_use]
pub fn build_badge(items: &[LineItem], cart_id: Option<&CartId>, name: Option<&str>) -> Badge {
    let count = items
        .iter()
        .map(|item| item.quantity.unwrap_or(0))
        .fold(0_u32, u32::saturating_add);

    let total = items
        .iter()
        .map(|item| {
            let unit = item
                .customized_price
                .or(item.price)
                .unwrap_or(Decimal::ZERO);
            unit.saturating_mul(Decimal::from(item.quantity.unwrap_or(1)))
        })
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_BADGE_NAME);

    Badge {
        count,
        total: total.normalize(),
        name: name.to_owned(),
        cart_id: cart_id.cloned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn items(value: serde_json::Value) -> Vec<LineItem> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_team_lunch_badge() {
        let items = items(json!([
            { "quantity": 2, "price": 5 },
            { "quantity": 1, "customizedPrice": 3 }
        ]));
        let cart = CartId::new("cart1");

        let badge = build_badge(&items, Some(&cart), Some("Team Lunch"));

        assert_eq!(
            badge,
            Badge {
                count: 3,
                total: Decimal::new(13, 0),
                name: "Team Lunch".to_owned(),
                cart_id: Some(cart),
            }
        );
        assert_eq!(
            serde_json::to_value(&badge).unwrap(),
            json!({ "count": 3, "total": 13.0, "name": "Team Lunch", "cartId": "cart1" })
        );
    }

    #[test]
    fn test_non_numeric_quantity_counts_as_zero() {
        let items = items(json!([
            { "quantity": "many", "price": 4 },
            { "quantity": 1, "price": 2 }
        ]));

        let badge = build_badge(&items, None, None);
        assert_eq!(badge.count, 1);
        assert_eq!(badge.total, Decimal::new(2, 0));
    }

    #[test]
    fn test_missing_quantity_prices_as_one() {
        let items = items(json!([{ "price": 6 }]));

        let badge = build_badge(&items, None, None);
        assert_eq!(badge.count, 0);
        assert_eq!(badge.total, Decimal::new(6, 0));
    }

    #[test]
    fn test_missing_prices_are_zero() {
        let items = items(json!([{ "quantity": 3 }, { "quantity": 1, "price": "free" }]));

        let badge = build_badge(&items, None, None);
        assert_eq!(badge.count, 4);
        assert_eq!(badge.total, Decimal::ZERO);
    }

    #[test]
    fn test_default_name() {
        assert_eq!(build_badge(&[], None, None).name, DEFAULT_BADGE_NAME);
        assert_eq!(build_badge(&[], None, Some("  ")).name, DEFAULT_BADGE_NAME);
        assert_eq!(build_badge(&[], None, Some("Friday")).name, "Friday");
    }

    #[test]
    fn test_empty_cart() {
        let badge = build_badge(&[], None, None);
        assert_eq!(badge.count, 0);
        assert_eq!(badge.total, Decimal::ZERO);
        assert_eq!(badge.cart_id, None);
    }

    #[test]
    fn test_update_drops_unknown_fields() {
        let update: BadgeUpdate = serde_json::from_value(json!({
            "count": 4,
            "total": 22.5,
            "name": "Team Lunch",
            "cartId": "cart1",
            "restaurant": { "id": "r1", "menu": [] },
            "items": [{ "quantity": 4 }],
            "fulfillment": { "mode": "delivery" }
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "count": 4, "total": 22.5, "name": "Team Lunch", "cartId": "cart1" })
        );
    }

    #[test]
    fn test_apply_preserves_unspecified_fields() {
        let mut badge = Badge {
            count: 2,
            total: Decimal::new(10, 0),
            name: "Team Lunch".to_owned(),
            cart_id: Some(CartId::new("cart1")),
        };

        badge.apply(&BadgeUpdate {
            count: Some(5),
            ..BadgeUpdate::default()
        });

        assert_eq!(badge.count, 5);
        assert_eq!(badge.total, Decimal::new(10, 0));
        assert_eq!(badge.name, "Team Lunch");
        assert_eq!(badge.cart_id, Some(CartId::new("cart1")));
    }

    #[test]
    fn test_full_badge_update_replaces_snapshot() {
        let built = build_badge(
            &items(json!([{ "quantity": 1, "price": 9 }])),
            Some(&CartId::new("c2")),
            Some("Dinner"),
        );

        let merged = Badge::default().merged(&BadgeUpdate::from(built.clone()));
        assert_eq!(merged, built);
    }

    #[test]
    fn test_cart_scoping() {
        let cart = CartId::new("c1");
        let unscoped = BadgeUpdate::default();
        let same = BadgeUpdate {
            cart_id: Some(cart.clone()),
            ..BadgeUpdate::default()
        };
        let other = BadgeUpdate {
            cart_id: Some(CartId::new("c2")),
            ..BadgeUpdate::default()
        };

        assert!(!unscoped.is_for_other_cart(&cart));
        assert!(!same.is_for_other_cart(&cart));
        assert!(other.is_for_other_cart(&cart));
    }
}
