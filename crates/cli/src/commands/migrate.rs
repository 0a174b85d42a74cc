//! Session store migration.
//!
//! The storefront keeps each visitor's cart, identity and notices in a
//! `tower-sessions` session persisted to `PostgreSQL`. This command creates
//! the `tower_sessions` schema and its `session` table.
//!
//! # Usage
//!
//! ```bash
//! lunar-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LUNAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;

use lunar_system_storefront::{db, middleware};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the session table if it does not exist yet.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the migration fails.
pub async fn sessions() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LUNAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("LUNAR_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("Running session store migration...");
    middleware::postgres_store(&pool).migrate().await?;

    tracing::info!("Session store migration complete!");
    Ok(())
}
