//! Database migration runner
//!
//! Migrations are SQL files in the workspace `migrations/` directory, applied
//! through sqlx's embedded migrator. Each migration is a
//! `{version}_{name}.up.sql` file with a matching `.down.sql` rollback.
//!
//! # Example
//!
//! ```no_run
//! use flowboard_shared::db::migrations::run_migrations;
//! use flowboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or a statement fails;
/// the failing migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database if it does not exist.
///
/// For development and tests; production databases are provisioned
/// externally.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
