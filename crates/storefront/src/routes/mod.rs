//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (?q=, ?category=, ?cart=open)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog loaded)
//!
//! # Search
//! GET  /search/suggest         - Suggestion dropdown fragment (?q=)
//!
//! # Catalog
//! POST /catalog/refresh        - Re-fetch the product list
//!
//! # Cart (forms, 303 back to /?cart=open)
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Overwrite a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Auth (Google Identity Services)
//! POST /auth/google/callback   - Credential callback from the sign-in widget
//! POST /auth/logout            - Sign out
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod home;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google/callback", post(auth::google_callback))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .layer(cart_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Search suggestions
        .route("/search/suggest", get(search::suggest))
        // Catalog refresh
        .route("/catalog/refresh", post(catalog::refresh))
        // Cart routes
        .nest("/cart", cart_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
