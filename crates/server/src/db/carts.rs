//! Cart repository.
//!
//! Items are read as whole-row JSON so that [`LineItem::from_raw`] can
//! resolve prices from whichever columns a row has populated.

use sqlx::PgPool;
use sqlx::types::Json;

use group_order_core::{CartId, LineItem};

use super::RepositoryError;

/// A cart row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartRecord {
    pub id: CartId,
    pub name: Option<String>,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &CartId) -> Result<Option<CartRecord>, RepositoryError> {
        let cart = sqlx::query_as::<_, CartRecord>(
            "SELECT id::text AS id, name FROM carts WHERE id::text = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// List a cart's line items in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: &CartId) -> Result<Vec<LineItem>, RepositoryError> {
        let rows: Vec<(Json<serde_json::Value>,)> = sqlx::query_as(
            r"
            SELECT to_jsonb(ci) AS row
            FROM cart_items ci
            WHERE ci.cart_id::text = $1
            ORDER BY ci.created_at, ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|(Json(row),)| LineItem::from_raw(row))
            .collect())
    }
}
