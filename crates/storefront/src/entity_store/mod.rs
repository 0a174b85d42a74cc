//! Remote entity store client.
//!
//! The entity store is an external JSON-over-HTTP service that owns the
//! product catalog and receives best-effort cart records. Only two
//! collection operations are used:
//!
//! - `products.list()` - `GET {base}/entities/products`
//! - `cart_items.create()` - `POST {base}/entities/cart_items`
//!
//! # Example
//!
//! ```rust,ignore
//! use lunar_system_storefront::entity_store::EntityStoreClient;
//!
//! let client = EntityStoreClient::new(&config.entity_store)?;
//! let products = client.list_products().await?;
//! ```

pub mod types;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::EntityStoreConfig;

pub use types::{CartItemRecord, Product, ProductList};

/// Errors that can occur when talking to the entity store.
#[derive(Debug, Error)]
pub enum EntityStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Entity store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid entity store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the remote entity store.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct EntityStoreClient {
    inner: Arc<EntityStoreClientInner>,
}

struct EntityStoreClientInner {
    client: reqwest::Client,
    products_url: Url,
    cart_items_url: Url,
    api_key: Option<SecretString>,
}

impl EntityStoreClient {
    /// Create a new entity store client.
    ///
    /// # Errors
    ///
    /// Returns `EntityStoreError::InvalidUrl` if the collection endpoints
    /// cannot be derived from the configured base URL.
    pub fn new(config: &EntityStoreConfig) -> Result<Self, EntityStoreError> {
        Ok(Self {
            inner: Arc::new(EntityStoreClientInner {
                client: reqwest::Client::new(),
                products_url: collection_url(&config.base_url, "products")?,
                cart_items_url: collection_url(&config.base_url, "cart_items")?,
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// `products.list()`: fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the store answers with a
    /// non-success status, or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, EntityStoreError> {
        let response = self
            .authorize(self.inner.client.get(self.inner.products_url.clone()))
            .send()
            .await?;

        let body = ensure_success(response).await?;
        let products = parse_product_list(&body)?;

        tracing::debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    /// `cart_items.create()`: record an add-to-cart event.
    ///
    /// The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store answers with a
    /// non-success status.
    #[instrument(skip(self, record), fields(product_id = %record.product_id))]
    pub async fn create_cart_item(&self, record: &CartItemRecord) -> Result<(), EntityStoreError> {
        let response = self
            .authorize(self.inner.client.post(self.inner.cart_items_url.clone()))
            .json(record)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

/// Build `{base}/entities/{collection}`, tolerating a base without a trailing slash.
fn collection_url(base: &Url, collection: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("entities/{collection}"))
}

/// Read the body, turning non-success statuses into `EntityStoreError::Status`.
async fn ensure_success(response: reqwest::Response) -> Result<String, EntityStoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Entity store returned non-success status"
        );
        return Err(EntityStoreError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    Ok(body)
}

/// Parse a `products.list()` body; a `null` list is an empty catalog.
///
/// Entries that are not valid products are skipped with a warning.
pub(crate) fn parse_product_list(body: &str) -> Result<Vec<Product>, EntityStoreError> {
    let list: ProductList = serde_json::from_str(body)?;

    Ok(list
        .list
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Product>(entry) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed product");
                None
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url_with_and_without_trailing_slash() {
        let base = Url::parse("https://store.example.com/v1/lunar").unwrap();
        assert_eq!(
            collection_url(&base, "products").unwrap().as_str(),
            "https://store.example.com/v1/lunar/entities/products"
        );

        let base = Url::parse("https://store.example.com/v1/lunar/").unwrap();
        assert_eq!(
            collection_url(&base, "cart_items").unwrap().as_str(),
            "https://store.example.com/v1/lunar/entities/cart_items"
        );
    }

    #[test]
    fn test_parse_product_list() {
        let body = r#"{"list": [{"_id": "p1", "name": "Spotify", "category": "musica", "currentPrice": 9.9}]}"#;
        let products = parse_product_list(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Spotify");
    }

    #[test]
    fn test_parse_skips_malformed_products() {
        let body = r#"{"list": [
            {"_id": "p1", "name": "Netflix", "category": "streaming", "currentPrice": null},
            {"_id": "p2", "name": "Spotify", "category": "musica", "currentPrice": 9.9},
            "not a product",
            {"name": "Canva", "category": "ferramentas", "currentPrice": 15}
        ]}"#;

        let products = parse_product_list(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "p2");
    }

    #[test]
    fn test_parse_null_or_missing_list_is_empty() {
        assert!(parse_product_list(r#"{"list": null}"#).unwrap().is_empty());
        assert!(parse_product_list("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            parse_product_list("<html>oops</html>"),
            Err(EntityStoreError::Parse(_))
        ));
    }

    #[test]
    fn test_status_error_display() {
        let err = EntityStoreError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entity store returned HTTP 503: unavailable"
        );
    }
}
