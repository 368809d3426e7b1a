/// Database migration runner
///
/// Migrations live in `taskboard-shared/migrations/` and are embedded into
/// the binary with `sqlx::migrate!`, so a deployed server can bring its own
/// schema up to date at startup.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply; already-applied
/// migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}
