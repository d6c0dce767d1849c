//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary
//! and applied in file-name order when a [`crate::Database`] opens.
//!
//! ```text
//! migrations/sqlite/
//! ├── 001_initial_schema.sql   products, customers, sales, sale_items
//! └── 002_auth.sql             users, profiles, sessions
//! ```
//!
//! Applied versions are tracked by sqlx in `_sqlx_migrations`. Shipped files
//! are never edited; schema changes go into a new numbered file.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is behind the embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations compiled into this build.
    pub embedded: usize,
    /// Migrations recorded as applied in the database.
    pub applied: usize,
}

impl MigrationStatus {
    pub fn pending(&self) -> usize {
        self.embedded.saturating_sub(self.applied)
    }

    pub fn is_current(&self) -> bool {
        self.pending() == 0
    }
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    if before.is_current() {
        debug!(applied = before.applied, "Schema is current");
        return Ok(());
    }

    info!(pending = before.pending(), "Applying schema migrations");
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DbError::MigrationFailed(e.to_string()))?;

    info!(version = MIGRATOR.migrations.len(), "Schema migrated");
    Ok(())
}

/// Compares the embedded migrations with those recorded in the database.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let tracked: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await?;

    // A fresh file has no bookkeeping table until the first run
    let applied: i64 = match tracked {
        Some(_) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(pool)
                .await?
        }
        None => 0,
    };

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: applied as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_database_has_pending_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status.applied, 0);
        assert_eq!(status.pending(), 2);
        assert!(!status.is_current());
    }

    #[tokio::test]
    async fn test_running_twice_is_harmless() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert!(status.is_current());
        assert_eq!(status.embedded, 2);
    }
}
