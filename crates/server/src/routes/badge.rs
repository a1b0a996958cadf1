//! Cart badge route handlers.
//!
//! Cart mutations elsewhere in the system post badge updates here; open
//! browser tabs follow them over SSE. Badges can also be computed from the
//! stored cart, either for one viewer or for the whole cart.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use group_order_core::{
    Badge, BadgeUpdate, CartId, Identity, LineItem, MemberId, build_badge, filter_for_viewer,
    format_price,
};

use crate::db::{CartRecord, CartRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{BADGE_TOPIC, BadgeListener};
use crate::state::AppState;

/// Response for a published badge update.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Listeners the update was queued for.
    pub delivered: usize,
}

/// Response for a recomputed and published cart badge.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub badge: Badge,
    pub delivered: usize,
}

/// Query for the badge event stream.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Only stream updates for this cart.
    pub cart_id: Option<String>,
}

/// Query describing who is looking at the cart.
#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub member_id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Count every item instead of only the viewer's.
    #[serde(default)]
    pub all: bool,
}

impl ViewerQuery {
    fn viewer(&self) -> Option<MemberId> {
        non_blank(self.member_id.as_deref()).map(MemberId::new)
    }

    fn identity(&self) -> Option<Identity> {
        let email = non_blank(self.email.as_deref()).map(String::from);
        let full_name = non_blank(self.full_name.as_deref()).map(String::from);
        (email.is_some() || full_name.is_some()).then(|| Identity::new(email, full_name))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Badge for one viewer's share of a cart.
#[must_use]
pub fn viewer_badge(cart: &CartRecord, items: &[LineItem], query: &ViewerQuery) -> Badge {
    let viewer = query.viewer();
    let identity = query.identity();
    let visible = filter_for_viewer(Some(items), viewer.as_ref(), identity.as_ref(), query.all);
    build_badge(&visible, Some(&cart.id), cart.name.as_deref())
}

/// Publish a badge update to every open listener.
///
/// POST /api/badge
///
/// Fields outside the badge (restaurant, items, fulfillment) are dropped
/// when the body is parsed.
#[instrument(skip(state))]
pub async fn publish(
    State(state): State<AppState>,
    Json(update): Json<BadgeUpdate>,
) -> (StatusCode, Json<PublishResponse>) {
    let delivered = state.badges().publish(update);
    (StatusCode::ACCEPTED, Json(PublishResponse { delivered }))
}

/// Stream badge updates via SSE.
///
/// GET /api/badge/events?cart_id=
///
/// Each event carries the listener's merged snapshot, so clients can render
/// it as-is even when an update only changed the count.
#[instrument(skip(state))]
pub async fn events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let scope = non_blank(query.cart_id.as_deref()).map(CartId::new);
    let initial = Badge {
        cart_id: scope.clone(),
        ..Badge::default()
    };

    // Subscribe before the response starts so no update published after this
    // request was accepted is missed.
    let mut listener = BadgeListener::new(initial).scoped_to(scope);
    listener.subscribe(state.badges());

    let stream = async_stream::stream! {
        while let Some(badge) = listener.next().await {
            match Event::default().event(BADGE_TOPIC).json_data(&badge) {
                Ok(event) => yield Ok::<_, Infallible>(event),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize badge event"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Badge for the viewer's share of a stored cart.
///
/// GET /api/carts/{cart_id}/badge?member_id=&email=&full_name=&all=
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<Badge>> {
    let (cart, items) = load_cart(&state, CartId::new(cart_id)).await?;
    Ok(Json(viewer_badge(&cart, &items, &query)))
}

/// Recompute a stored cart's badge and publish it.
///
/// POST /api/carts/{cart_id}/badge
#[instrument(skip(state))]
pub async fn refresh(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<RefreshResponse>> {
    let (cart, items) = load_cart(&state, CartId::new(cart_id)).await?;
    let badge = build_badge(&items, Some(&cart.id), cart.name.as_deref());

    let total = format_price(badge.total);
    add_breadcrumb(
        "badge",
        "Cart badge refreshed",
        &[("cart_id", cart.id.as_str()), ("total", total.as_str())],
    );
    let delivered = state.badges().publish(BadgeUpdate::from(badge.clone()));
    tracing::info!(
        cart_id = %cart.id,
        count = badge.count,
        %total,
        delivered,
        "Cart badge published"
    );

    Ok(Json(RefreshResponse { badge, delivered }))
}

async fn load_cart(state: &AppState, cart_id: CartId) -> Result<(CartRecord, Vec<LineItem>)> {
    let repo = CartRepository::new(state.pool());
    let cart = repo
        .get(&cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart {cart_id}")))?;
    let items = repo.items(&cart.id).await?;
    Ok((cart, items))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use group_order_core::Assignee;

    use super::*;

    fn team_lunch() -> (CartRecord, Vec<LineItem>) {
        let cart = CartRecord {
            id: CartId::new("cart1"),
            name: Some("Team Lunch".to_string()),
        };
        let items = vec![
            LineItem {
                quantity: Some(2),
                price: Some(Decimal::new(5, 0)),
                added_by_member_id: Some(MemberId::new("m1")),
                ..LineItem::default()
            },
            LineItem {
                quantity: Some(1),
                customized_price: Some(Decimal::new(3, 0)),
                assigned_to: vec![Assignee::guest("Dana").with_email("dana@lunch.test")],
                ..LineItem::default()
            },
        ];
        (cart, items)
    }

    #[test]
    fn test_viewer_badge_for_whole_cart() {
        let (cart, items) = team_lunch();
        let query = ViewerQuery {
            all: true,
            ..ViewerQuery::default()
        };

        let badge = viewer_badge(&cart, &items, &query);
        assert_eq!(badge.count, 3);
        assert_eq!(badge.total, Decimal::new(13, 0));
        assert_eq!(badge.name, "Team Lunch");
    }

    #[test]
    fn test_viewer_badge_by_member() {
        let (cart, items) = team_lunch();
        let query = ViewerQuery {
            member_id: Some("m1".to_string()),
            ..ViewerQuery::default()
        };

        let badge = viewer_badge(&cart, &items, &query);
        assert_eq!(badge.count, 2);
        assert_eq!(badge.total, Decimal::new(10, 0));
    }

    #[test]
    fn test_viewer_badge_by_email() {
        let (cart, items) = team_lunch();
        let query = ViewerQuery {
            member_id: Some("guest-9".to_string()),
            email: Some(" DANA@lunch.test ".to_string()),
            ..ViewerQuery::default()
        };

        let badge = viewer_badge(&cart, &items, &query);
        assert_eq!(badge.count, 1);
        assert_eq!(badge.total, Decimal::new(3, 0));
    }

    #[test]
    fn test_blank_viewer_sees_nothing() {
        let (cart, items) = team_lunch();
        let query = ViewerQuery {
            member_id: Some("   ".to_string()),
            email: Some(String::new()),
            ..ViewerQuery::default()
        };

        assert_eq!(query.viewer(), None);
        assert_eq!(query.identity(), None);
        let badge = viewer_badge(&cart, &items, &query);
        assert_eq!(badge.count, 0);
        assert_eq!(badge.cart_id, Some(CartId::new("cart1")));
    }

    #[test]
    fn test_publish_response_shape() {
        let body = serde_json::to_value(PublishResponse { delivered: 2 }).unwrap();
        assert_eq!(body, json!({ "delivered": 2 }));
    }
}
