//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use group_order_core::{OrderId, OrderStatus};

use super::RepositoryError;

/// An order row, as far as this service needs it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: OrderId,
    pub status: OrderStatus,
    pub contact_email: Option<String>,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &OrderId) -> Result<Option<OrderRecord>, RepositoryError> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r"
            SELECT id::text AS id, status, contact_email, cancel_reason, cancelled_at
            FROM orders
            WHERE id::text = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Mark an order cancelled, recording the reason.
    ///
    /// The update only applies to orders that are not already cancelled, so
    /// two concurrent cancellations cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order was cancelled in the
    /// meantime, `RepositoryError::NotFound` if it no longer exists, and
    /// `RepositoryError::Database` if the query fails.
    pub async fn cancel(
        &self,
        id: &OrderId,
        reason: Option<&str>,
    ) -> Result<OrderRecord, RepositoryError> {
        let updated = sqlx::query_as::<_, OrderRecord>(
            r"
            UPDATE orders
            SET status = 'cancelled',
                cancel_reason = $2,
                cancelled_at = now(),
                updated_at = now()
            WHERE id::text = $1 AND status <> 'cancelled'
            RETURNING id::text AS id, status, contact_email, cancel_reason, cancelled_at
            ",
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(order) => Ok(order),
            None => match self.get(id).await? {
                Some(_) => Err(RepositoryError::Conflict(format!(
                    "order {id} is already cancelled"
                ))),
                None => Err(RepositoryError::NotFound),
            },
        }
    }
}
