//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the order mirror
//! - `DATABASE_URL` - Fallback when the above is unset
//!
//! # Migration Files
//!
//! Bundled at compile time from `crates/storefront/migrations/`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("../storefront/migrations");

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Resolve the database URL from the flag or the environment.
fn database_url(flag: Option<String>) -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    flag.or_else(|| std::env::var("STOREFRONT_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Apply pending order mirror migrations.
///
/// # Errors
///
/// Returns an error if no database URL is available, the database cannot be
/// reached, or a migration fails.
pub async fn run(flag: Option<String>) -> Result<(), MigrationError> {
    let database_url = database_url(flag)?;

    tracing::info!("Connecting to order mirror database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!(count = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Log the bundled migrations.
pub fn list() {
    for migration in MIGRATOR.iter() {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "Bundled migration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_migration_is_bundled() {
        assert!(
            MIGRATOR
                .iter()
                .any(|migration| migration.description.contains("orders"))
        );
    }

    #[test]
    fn test_flag_takes_precedence() {
        let url = database_url(Some("postgres://flag/db".to_string()));
        assert!(matches!(url, Ok(url) if url.expose_secret() == "postgres://flag/db"));
    }
}
