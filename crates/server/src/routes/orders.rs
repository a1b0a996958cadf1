//! Order route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use group_order_core::{Email, OrderId};

use crate::db::{OrderRecord, OrderRepository, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::EmailService;
use crate::state::AppState;

/// Body of a cancellation request. The body itself is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

impl CancelRequest {
    /// Parse a possibly empty request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if a non-empty body is not valid JSON.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("invalid cancellation body: {e}")))
    }

    /// The reason, if one was actually given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Response for a successful cancellation.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub ok: bool,
}

/// Decide whether an order may be cancelled.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the order does not exist and
/// `AppError::Conflict` when it is already cancelled.
pub fn ensure_cancellable(order_id: &OrderId, order: Option<&OrderRecord>) -> Result<()> {
    match order {
        None => Err(AppError::NotFound(format!("order {order_id}"))),
        Some(order) if order.status.is_cancelled() => Err(AppError::Conflict(format!(
            "order {order_id} is already cancelled"
        ))),
        Some(_) => Ok(()),
    }
}

/// Cancel an order.
///
/// POST /api/orders/{id}/cancel
///
/// When the order has a contact address a cancellation notice is sent in the
/// background; delivery problems are logged and do not affect the response.
#[instrument(skip(state, body))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CancelResponse>> {
    let request = CancelRequest::from_body(&body)?;
    let order_id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    let existing = repo.get(&order_id).await?;
    ensure_cancellable(&order_id, existing.as_ref())?;

    let order = repo
        .cancel(&order_id, request.reason())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("order {order_id}")),
            other => other.into(),
        })?;

    tracing::info!(order_id = %order.id, "Order cancelled");
    add_breadcrumb("order", "Order cancelled", &[("order_id", order.id.as_str())]);

    if let Some(contact) = order.contact_email.as_deref() {
        match Email::parse(contact) {
            Ok(to) => {
                tracing::debug!(
                    order_id = %order.id,
                    domain = to.domain(),
                    "Queueing cancellation notice"
                );
                notify_cancelled(
                    state.email().clone(),
                    to,
                    order.id.clone(),
                    order.cancel_reason.clone(),
                );
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Skipping cancellation notice");
            }
        }
    }

    Ok(Json(CancelResponse { ok: true }))
}

fn notify_cancelled(email: EmailService, to: Email, order_id: OrderId, reason: Option<String>) {
    tokio::spawn(async move {
        if let Err(e) = email
            .send_order_cancelled(to.as_str(), &order_id, reason.as_deref())
            .await
        {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to send cancellation notice");
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use group_order_core::OrderStatus;

    use super::*;

    fn order(status: OrderStatus) -> OrderRecord {
        OrderRecord {
            id: OrderId::new("ord-1"),
            status,
            contact_email: Some("host@lunch.test".to_string()),
            cancel_reason: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_missing_order_is_not_found() {
        let result = ensure_cancellable(&OrderId::new("ord-1"), None);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_cancelled_order_conflicts() {
        let existing = order(OrderStatus::Cancelled);
        let result = ensure_cancellable(&existing.id, Some(&existing));
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_open_orders_are_cancellable() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ] {
            let existing = order(status);
            assert!(ensure_cancellable(&existing.id, Some(&existing)).is_ok());
        }
    }

    #[test]
    fn test_body_is_optional() {
        assert_eq!(CancelRequest::from_body(b"").unwrap().reason(), None);
        assert_eq!(CancelRequest::from_body(b"  \n").unwrap().reason(), None);
        assert_eq!(CancelRequest::from_body(b"{}").unwrap().reason(), None);
    }

    #[test]
    fn test_reason_is_trimmed() {
        let request = CancelRequest::from_body(br#"{"reason": "  Office closed  "}"#).unwrap();
        assert_eq!(request.reason(), Some("Office closed"));

        let request = CancelRequest::from_body(br#"{"reason": "   "}"#).unwrap();
        assert_eq!(request.reason(), None);
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        assert!(matches!(
            CancelRequest::from_body(b"{reason"),
            Err(AppError::BadRequest(_))
        ));
    }
}
