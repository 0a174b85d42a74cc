//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Product list snapshot, search filtering and category grouping
//! - `cart` - Cart bound to the visitor's storage, plus remote add-to-cart records
//! - `identity` - Google sign-in widget capability and credential decoding
//! - `notices` - One-shot notifications queued for the next render

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod notices;

pub use cart::ShoppingCart;
pub use catalog::{Catalog, CatalogStatus, CategoryGroup};
pub use identity::{GoogleIdentityWidget, IdentityError, SignInWidget, WidgetStatus};
