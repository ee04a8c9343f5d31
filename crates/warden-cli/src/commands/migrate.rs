//! Database migration command.

use warden_core::error::AppError;
use warden_database::DatabasePool;

use crate::output;

/// Apply all pending migrations
pub async fn execute(pool: &DatabasePool) -> Result<(), AppError> {
    let applied = warden_database::migration::run_migrations(pool.pool()).await?;

    if applied.is_empty() {
        output::print_success("Schema is already up to date.");
        return Ok(());
    }

    for migration in &applied {
        output::print_kv(&migration.version.to_string(), &migration.description);
    }
    output::print_success(&format!("Applied {} migration(s).", applied.len()));
    Ok(())
}
