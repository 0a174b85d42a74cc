//! Wire types for the remote entity store.
//!
//! Field names follow the store's camelCase JSON; identifiers are `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lunar_system_core::{Category, Price, ProductId, SessionId};

/// A product as listed by `products.list()`.
///
/// Immutable from the storefront's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub current_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Price>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    /// Display-style tag (a CSS class naming the card's gradient).
    #[serde(default)]
    pub image_class: String,
    /// Subscription length label, e.g. "30 dias".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Response body of `products.list()`.
///
/// The store answers `{"list": null}` for an empty collection. Entries are
/// kept as raw JSON so one malformed product does not sink the whole list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub list: Option<Vec<serde_json::Value>>,
}

/// Request body of `cart_items.create()`: a best-effort record of an add-to-cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    pub session_id: SessionId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_parses_store_json() {
        let json = r#"{
            "_id": "p1",
            "name": "Netflix Premium",
            "category": "streaming",
            "currentPrice": 19.9,
            "oldPrice": 39.9,
            "inStock": true,
            "description": "Tela 4K",
            "brand": "Netflix",
            "imageClass": "bg-netflix",
            "duration": "30 dias"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.category, Category::Streaming);
        assert_eq!(product.current_price, Price::from_cents(1990));
        assert_eq!(product.old_price, Some(Price::from_cents(3990)));
        assert!(product.in_stock);
        assert_eq!(product.duration.as_deref(), Some("30 dias"));
    }

    #[test]
    fn test_product_optional_fields_default() {
        let json = r#"{"_id": "p2", "name": "Canva", "category": "ferramentas", "currentPrice": 5}"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert!(!product.in_stock);
        assert!(product.brand.is_empty());
        assert!(product.description.is_empty());
        assert_eq!(product.old_price, None);
    }

    #[test]
    fn test_cart_item_record_serializes_camel_case() {
        let record = CartItemRecord {
            session_id: SessionId::new("session_abc"),
            product_id: ProductId::new("p1"),
            quantity: 1,
            created_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sessionId"], "session_abc");
        assert_eq!(value["productId"], "p1");
        assert_eq!(value["quantity"], 1);
        assert_eq!(value["createdAt"], "2026-01-02T03:04:05Z");
    }
}
