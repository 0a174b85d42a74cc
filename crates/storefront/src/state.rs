//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::entity_store::{EntityStoreClient, EntityStoreError};
use crate::services::{Catalog, GoogleIdentityWidget};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the entity store client and the catalog snapshot.
/// Per-visitor state (cart, identity, notices) lives in the session, not here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    entity_store: EntityStoreClient,
    catalog: Catalog,
    widget: GoogleIdentityWidget,
}

impl AppState {
    /// Create a new application state with an empty (loading) catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity store endpoints cannot be built from
    /// the configured base URL.
    pub fn new(config: StorefrontConfig) -> Result<Self, EntityStoreError> {
        let entity_store = EntityStoreClient::new(&config.entity_store)?;
        Ok(Self::with_catalog(config, entity_store, Catalog::new()))
    }

    /// Create application state around an existing client and catalog.
    #[must_use]
    pub fn with_catalog(
        config: StorefrontConfig,
        entity_store: EntityStoreClient,
        catalog: Catalog,
    ) -> Self {
        let widget = GoogleIdentityWidget::new(config.google_client_id.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                entity_store,
                catalog,
                widget,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the entity store client.
    #[must_use]
    pub fn entity_store(&self) -> &EntityStoreClient {
        &self.inner.entity_store
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the Google sign-in widget.
    #[must_use]
    pub fn widget(&self) -> &GoogleIdentityWidget {
        &self.inner.widget
    }

    /// Start fetching the catalog on a background task.
    pub fn start_catalog_fetch(&self) {
        crate::services::catalog::refresh_in_background(
            self.catalog().clone(),
            self.entity_store().clone(),
        );
    }
}
