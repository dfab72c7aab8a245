//! Database operations for the storefront `PostgreSQL` mirror.
//!
//! # Database
//!
//! Postgres is never the source of truth: orders live in process memory and
//! are copied here best-effort.
//!
//! ## Tables
//!
//! - `storefront.orders` - One row per order, status columns kept current
//! - `storefront.order_items` - Line snapshots frozen at order creation
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p greenhouse-cli -- migrate
//! ```

pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::{DisabledMirror, OrderChange, OrderMirror, PgOrderMirror, RecordingMirror};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., duplicate order id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool that connects on first use.
///
/// The mirror must not keep the server from starting, so no connection is
/// attempted here.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url.expose_secret())
}
