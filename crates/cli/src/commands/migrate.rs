//! Database migration commands.
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server crate, so the CLI and the server always agree on the schema.
//!
//! # Environment Variables
//!
//! - `GROUP_ORDER_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use std::collections::HashSet;

use group_order_server::db::{MIGRATOR, create_pool};
use sqlx::migrate::Migrate;

use super::{CommandError, database_url};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Log each known migration and whether it has been applied.
///
/// # Errors
///
/// Returns error if the database is unreachable or the migrations table
/// cannot be read.
pub async fn status() -> Result<(), CommandError> {
    let url = database_url()?;
    let pool = create_pool(&url).await?;

    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            state,
            "Migration"
        );
    }

    Ok(())
}
