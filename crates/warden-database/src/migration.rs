//! Schema migrations embedded from the workspace `migrations/` directory.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::{Migrate, MigrateError, Migrator};

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// A migration applied by [`run_migrations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// Timestamp prefix of the migration file.
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
}

/// Apply every pending migration and report which ones ran.
///
/// An empty result means the schema was already current.
pub async fn run_migrations(pool: &PgPool) -> AppResult<Vec<AppliedMigration>> {
    let pending = pending_migrations(pool).await?;

    MIGRATOR.run(pool).await.map_err(migrate_error)?;

    for migration in &pending {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );
    }
    tracing::info!(applied = pending.len(), "Schema is up to date");
    Ok(pending)
}

async fn pending_migrations(pool: &PgPool) -> AppResult<Vec<AppliedMigration>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| crate::map_sqlx_error("Failed to acquire connection", e))?;
    conn.ensure_migrations_table().await.map_err(migrate_error)?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await
        .map_err(migrate_error)?
        .into_iter()
        .map(|m| m.version)
        .collect();

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !applied.contains(&m.version))
        .map(|m| AppliedMigration {
            version: m.version,
            description: m.description.to_string(),
        })
        .collect())
}

fn migrate_error(e: MigrateError) -> AppError {
    AppError::with_source(
        ErrorKind::Database,
        format!("Failed to run migrations: {e}"),
        e,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<(i64, String)> = MIGRATOR
            .iter()
            .map(|m| (m.version, m.description.to_string()))
            .collect();

        assert_eq!(
            versions,
            vec![
                (20250101000001, "create roles".to_string()),
                (20250101000002, "create users".to_string()),
                (20250101000003, "create user sessions".to_string()),
            ]
        );
    }
}
