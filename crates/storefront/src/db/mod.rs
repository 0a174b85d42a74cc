//! Database connection for the storefront's session storage.
//!
//! `PostgreSQL` holds one thing: the `tower_sessions.session` table backing
//! each visitor's local storage (cart, signed-in identity, pending notices).
//! Products and cart records live in the remote entity store.
//!
//! # Migrations
//!
//! The session table is created with:
//! ```bash
//! cargo run -p lunar-system-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool for the session store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
