//! Shopping cart aggregate.
//!
//! A cart is an insertion-ordered list of lines, at most one per product.
//! Each line snapshots the product's name, price, brand and display tag at
//! the moment it was first added; later catalog changes do not touch it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lunar_system_core::{CartLineId, Price, ProductId};

use crate::entity_store::Product;

/// Brand recorded for products that have none.
pub const FALLBACK_BRAND: &str = "Produto";

/// Why a persisted cart was rejected.
#[derive(Debug, Error)]
pub enum CartDecodeError {
    #[error("cart is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cart line for product {0} has quantity 0")]
    ZeroQuantity(ProductId),

    #[error("cart has more than one line for product {0}")]
    DuplicateLine(ProductId),
}

/// One cart entry, keyed by product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_class: String,
    #[serde(default)]
    pub brand: String,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        let brand = if product.brand.is_empty() {
            FALLBACK_BRAND.to_string()
        } else {
            product.brand.clone()
        };

        Self {
            id: CartLineId::generate(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.current_price,
            quantity: 1,
            image_class: product.image_class.clone(),
            brand,
        }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The cart aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line holding `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Add one unit of `product`. Returns the line's new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine::from_product(product));
        1
    }

    /// Delete the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Overwrite a line's quantity; zero or negative removes the line.
    ///
    /// Unknown products are ignored. Returns whether the cart changed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        match self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |total, line| total.saturating_add(line.quantity))
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Serialize to the persisted JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Parse a persisted cart, rejecting data that breaks the cart invariants.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON, a zero quantity, or two lines for
    /// the same product.
    pub fn from_json(json: &str) -> Result<Self, CartDecodeError> {
        let lines: Vec<CartLine> = serde_json::from_str(json)?;

        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(CartDecodeError::ZeroQuantity(line.product_id.clone()));
            }
            if !seen.insert(&line.product_id) {
                return Err(CartDecodeError::DuplicateLine(line.product_id.clone()));
            }
        }

        Ok(Self { lines })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use lunar_system_core::Category;

    use super::*;

    pub(crate) fn product(id: &str, name: &str, brand: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: Category::Streaming,
            current_price: Price::from_cents(cents),
            old_price: None,
            in_stock: true,
            description: String::new(),
            brand: brand.to_string(),
            image_class: format!("bg-{id}"),
            duration: None,
        }
    }

    #[test]
    fn test_add_same_product_twice_increments() {
        let p1 = product("p1", "Netflix", "NF", 1000);
        let mut cart = Cart::new();

        assert_eq!(cart.add(&p1), 1);
        assert_eq!(cart.add(&p1), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Price::from_cents(2000));
    }

    #[test]
    fn test_add_then_set_quantity_zero_empties_cart() {
        let p1 = product("p1", "Netflix", "NF", 1000);
        let mut cart = Cart::new();
        cart.add(&p1);
        cart.add(&p1);

        assert!(cart.set_quantity(&p1.id, 0));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::zero());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_set_quantity_zero_matches_remove() {
        let p1 = product("p1", "Netflix", "NF", 1000);
        let p2 = product("p2", "Spotify", "SP", 990);

        let mut a = Cart::new();
        a.add(&p1);
        a.add(&p2);
        let mut b = a.clone();

        a.set_quantity(&p1.id, 0);
        b.remove(&p1.id);
        assert_eq!(a, b);

        a.set_quantity(&p2.id, -3);
        b.remove(&p2.id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_quantity_overwrites_and_ignores_unknown() {
        let p1 = product("p1", "Netflix", "NF", 1000);
        let mut cart = Cart::new();
        cart.add(&p1);

        assert!(cart.set_quantity(&p1.id, 5));
        assert_eq!(cart.line(&p1.id).unwrap().quantity, 5);
        assert!(!cart.set_quantity(&p1.id, 5));

        assert!(!cart.set_quantity(&ProductId::new("missing"), 3));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_huge_quantity_of_huge_price_saturates() {
        let mut expensive = product("p1", "Netflix", "NF", 0);
        expensive.current_price = serde_json::from_str("1e20").unwrap();
        let mut cart = Cart::new();
        cart.add(&expensive);
        cart.add(&product("p2", "Spotify", "SP", 990));

        assert!(cart.set_quantity(&expensive.id, i64::MAX));
        assert_eq!(cart.line(&expensive.id).unwrap().quantity, u32::MAX);

        let saturated = expensive.current_price.times(u32::MAX);
        assert_eq!(cart.total_price(), saturated);
        assert!(cart.total_price().display().starts_with("R$ "));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "Netflix", "NF", 1000));
        assert!(!cart.remove(&ProductId::new("p9")));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&product("b", "B", "B", 100));
        cart.add(&product("a", "A", "A", 100));
        cart.add(&product("b", "B", "B", 100));

        let order: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn test_total_price_sums_line_subtotals() {
        let mut cart = Cart::new();
        let p1 = product("p1", "Netflix", "NF", 1990);
        let p2 = product("p2", "Spotify", "SP", 1050);
        cart.add(&p1);
        cart.add(&p2);
        cart.set_quantity(&p2.id, 3);

        assert_eq!(cart.total_price(), Price::from_cents(1990 + 3 * 1050));
    }

    #[test]
    fn test_snapshot_uses_fallback_brand() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "Mystery", "", 500));
        assert_eq!(cart.lines()[0].brand, FALLBACK_BRAND);
        assert!(cart.lines()[0].id.as_str().starts_with("cart_"));
    }

    #[test]
    fn test_json_round_trip_preserves_lines() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "Netflix", "NF", 1990));
        cart.add(&product("p2", "Spotify", "SP", 990));
        cart.add(&product("p1", "Netflix", "NF", 1990));

        let restored = Cart::from_json(&cart.to_json().unwrap()).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_persisted_format_is_camel_case() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "Netflix", "NF", 1990));

        let value: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        let line = &value[0];
        assert_eq!(line["productId"], "p1");
        assert_eq!(line["imageClass"], "bg-p1");
        assert_eq!(line["quantity"], 1);
        assert!(line["_id"].as_str().unwrap().starts_with("cart_"));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            Cart::from_json("not json"),
            Err(CartDecodeError::Parse(_))
        ));
        assert!(matches!(
            Cart::from_json(r#"{"lines": []}"#),
            Err(CartDecodeError::Parse(_))
        ));

        let zero = r#"[{"_id":"cart_1","productId":"p1","name":"N","price":1,"quantity":0}]"#;
        assert!(matches!(
            Cart::from_json(zero),
            Err(CartDecodeError::ZeroQuantity(_))
        ));

        let negative = r#"[{"_id":"cart_1","productId":"p1","name":"N","price":1,"quantity":-1}]"#;
        assert!(matches!(
            Cart::from_json(negative),
            Err(CartDecodeError::Parse(_))
        ));

        let duplicate = r#"[
            {"_id":"cart_1","productId":"p1","name":"N","price":1,"quantity":1},
            {"_id":"cart_2","productId":"p1","name":"N","price":1,"quantity":2}
        ]"#;
        assert!(matches!(
            Cart::from_json(duplicate),
            Err(CartDecodeError::DuplicateLine(_))
        ));
    }

    #[test]
    fn test_from_json_accepts_empty_array() {
        assert!(Cart::from_json("[]").unwrap().is_empty());
    }
}
