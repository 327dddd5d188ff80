//! # Database Migrations
//!
//! Embedded SQL migrations for Park'it.
//!
//! ## Migration Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      migrations/sqlite/                                 │
//! │                                                                         │
//! │  001_initial_schema.sql   parking + ticket tables, lookup indexes      │
//! │  002_default_spots.sql    spots 1-3 CAR, 4-5 BIKE                      │
//! │                                                                         │
//! │  Applied in filename order, recorded in _sqlx_migrations.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent: already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)`.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    // No bookkeeping table yet means nothing has been applied.
    if tracked == 0 {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;
    let applied = usize::try_from(applied)
        .map_err(|_| DbError::Internal(format!("applied migration count {} is negative", applied)))?;

    Ok((total, applied))
}
