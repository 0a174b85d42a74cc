//! Cart bound to the visitor's storage.
//!
//! Every mutation writes the whole cart back to storage before returning.
//! Adding a product also yields a [`CartItemRecord`] that the caller hands to
//! [`record_in_background`]; the local cart stays authoritative whatever
//! happens to that remote record.

use chrono::Utc;
use tracing::{instrument, warn};

use lunar_system_core::{Price, ProductId};

use crate::entity_store::{CartItemRecord, EntityStoreClient, Product};
use crate::models::{Cart, CartLine, session_keys};
use crate::storage::{LocalStorage, StorageError};

/// The visitor's cart together with the storage it persists to.
#[derive(Debug)]
pub struct ShoppingCart {
    storage: LocalStorage,
    cart: Cart,
}

impl ShoppingCart {
    /// Restore the cart from storage.
    ///
    /// Malformed stored data is discarded: the entry is erased and the cart
    /// starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself cannot be accessed.
    pub async fn restore(storage: LocalStorage) -> Result<Self, StorageError> {
        let cart = match storage.get_item(session_keys::CART).await? {
            None => Cart::new(),
            Some(raw) => match Cart::from_json(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "Discarding malformed stored cart");
                    storage.remove_item(session_keys::CART).await?;
                    Cart::new()
                }
            },
        };

        Ok(Self { storage, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    /// Add one unit of `product` and persist.
    ///
    /// Returns the remote record describing the event.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub async fn add(&mut self, product: &Product) -> Result<CartItemRecord, StorageError> {
        let quantity = self.cart.add(product);
        self.persist().await?;
        tracing::debug!(quantity, "Added to cart");

        Ok(CartItemRecord {
            session_id: self.storage.session_id().await?,
            product_id: product.id.clone(),
            quantity: 1,
            created_at: Utc::now(),
        })
    }

    /// Remove the line for `product_id` and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<bool, StorageError> {
        let removed = self.cart.remove(product_id);
        self.persist().await?;
        Ok(removed)
    }

    /// Overwrite a line's quantity (zero or less removes it) and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, StorageError> {
        let changed = self.cart.set_quantity(product_id, quantity);
        self.persist().await?;
        Ok(changed)
    }

    /// Empty the cart and erase it from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.storage.remove_item(session_keys::CART).await
    }

    async fn persist(&self) -> Result<(), StorageError> {
        self.storage
            .set_item(session_keys::CART, self.cart.to_json()?)
            .await
    }
}

/// Send `record` to the entity store on a detached task.
///
/// Failures are logged and otherwise ignored; nothing is retried.
pub fn record_in_background(client: EntityStoreClient, record: CartItemRecord) {
    tokio::spawn(async move {
        if let Err(e) = client.create_cart_item(&record).await {
            warn!(
                error = %e,
                product_id = %record.product_id,
                "Failed to record cart item (non-critical)"
            );
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::cart::tests::product;
    use crate::storage::tests::memory_storage;

    #[tokio::test]
    async fn test_add_persists_before_returning() {
        let storage = memory_storage();
        let p1 = product("p1", "Netflix", "NF", 1000);

        let mut cart = ShoppingCart::restore(storage.clone()).await.unwrap();
        let record = cart.add(&p1).await.unwrap();
        cart.add(&p1).await.unwrap();

        assert_eq!(record.product_id, p1.id);
        assert_eq!(record.quantity, 1);
        assert!(record.session_id.as_str().starts_with("session_"));

        // A "reload" sees the same cart.
        let reloaded = ShoppingCart::restore(storage).await.unwrap();
        assert_eq!(reloaded.cart(), cart.cart());
        assert_eq!(reloaded.total_items(), 2);
        assert_eq!(reloaded.total_price(), Price::from_cents(2000));
    }

    #[tokio::test]
    async fn test_records_share_session_id() {
        let storage = memory_storage();
        let mut cart = ShoppingCart::restore(storage).await.unwrap();

        let first = cart.add(&product("p1", "A", "A", 100)).await.unwrap();
        let second = cart.add(&product("p2", "B", "B", 100)).await.unwrap();
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove_persist() {
        let storage = memory_storage();
        let p1 = product("p1", "Netflix", "NF", 1000);
        let p2 = product("p2", "Spotify", "SP", 500);

        let mut cart = ShoppingCart::restore(storage.clone()).await.unwrap();
        cart.add(&p1).await.unwrap();
        cart.add(&p2).await.unwrap();
        cart.set_quantity(&p2.id, 4).await.unwrap();
        cart.set_quantity(&p1.id, 0).await.unwrap();

        let reloaded = ShoppingCart::restore(storage.clone()).await.unwrap();
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.lines()[0].quantity, 4);

        let mut reloaded = reloaded;
        assert!(reloaded.remove(&p2.id).await.unwrap());
        assert_eq!(
            storage.get_item(session_keys::CART).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_clear_erases_storage() {
        let storage = memory_storage();
        let mut cart = ShoppingCart::restore(storage.clone()).await.unwrap();
        cart.add(&product("p1", "A", "A", 100)).await.unwrap();

        cart.clear().await.unwrap();
        assert!(cart.cart().is_empty());
        assert_eq!(storage.get_item(session_keys::CART).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_storage_restores_empty_and_erases() {
        let storage = memory_storage();
        storage.set_item(session_keys::CART, "[{broken").await.unwrap();

        let cart = ShoppingCart::restore(storage.clone()).await.unwrap();
        assert!(cart.cart().is_empty());
        assert_eq!(storage.get_item(session_keys::CART).await.unwrap(), None);
    }
}
