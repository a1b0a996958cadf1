//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Database readiness check
//!
//! # Cart badge
//! POST /api/badge                       - Publish a badge update
//! GET  /api/badge/events                - Badge updates (SSE)
//! GET  /api/carts/{cart_id}/badge       - Viewer badge for a stored cart
//! POST /api/carts/{cart_id}/badge       - Recompute and publish a cart badge
//!
//! # Orders
//! POST /api/orders/{id}/cancel          - Cancel an order
//!
//! # Email
//! POST /api/send-email                  - Send a transactional email
//! ```

pub mod badge;
pub mod email;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the badge routes router.
pub fn badge_routes() -> Router<AppState> {
    Router::new()
        .route("/badge", post(badge::publish))
        .route("/badge/events", get(badge::events))
        .route(
            "/carts/{cart_id}/badge",
            get(badge::show).post(badge::refresh),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/orders/{id}/cancel", post(orders::cancel))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(
            "/api",
            Router::new()
                .merge(badge_routes())
                .merge(order_routes())
                .route("/send-email", post(email::send)),
        )
}
